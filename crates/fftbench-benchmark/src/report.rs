//! Result table, CSV and Markdown output.

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use fftbench_core::TimingMode;

use crate::result::{SweepResult, TimingLine};

/// Banner printed before the table.
///
/// # Example
///
/// ```
/// use fftbench_benchmark::{report, SweepResult};
/// use fftbench_core::TestConfiguration;
///
/// let result = SweepResult::new(&TestConfiguration::default(), "RustFFT", 8);
/// let banner = report::banner(&result);
/// assert!(banner.contains("Two-dimension real"));
/// assert!(banner.contains("Plan=MEASURE; In-place"));
/// ```
pub fn banner(result: &SweepResult) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "*** Starting {} test ***", result.description);
    let _ = writeln!(output, "FFT Engine  : {}", result.engine);
    let _ = writeln!(output, "Precision   : {}", capitalize(&result.precision.to_string()));
    let _ = writeln!(output, "Signal type : Random");
    let _ = writeln!(output, "Options     : {}", result.options);
    let _ = writeln!(output, "Loops       : {}", result.loops);
    let _ = writeln!(output, "Threads     : {}", result.threads);
    output
}

/// Column titles and separator.
pub fn table_header(timing: TimingMode) -> String {
    format!(
        "  Width | Height | Samples | {} time (s) |  CTGs \n -------+--------+---------+---------------+---------\n",
        timing
    )
}

/// One table row, without a trailing newline.
///
/// # Example
///
/// ```
/// use fftbench_benchmark::{report, TimingLine};
/// use fftbench_core::Shape;
///
/// let line = TimingLine {
///     shape: Shape::new(32, 64).unwrap(),
///     repetition: 20,
///     elapsed: 0.0123,
///     rate: 4.5,
/// };
/// assert_eq!(
///     report::table_row(&line),
///     "   2^6  |  2^5   |   2^11  |     0.012     |  4.500"
/// );
/// ```
pub fn table_row(line: &TimingLine) -> String {
    format!(
        "   2^{:<2} |  2^{:<2}  |   2^{:<2}  | {:9.3}     | {:6.3}",
        line.shape.log2_cols(),
        line.shape.log2_rows(),
        line.log2_total(),
        line.elapsed,
        line.rate
    )
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// CSV exporter for sweep results.
///
/// # Example
///
/// ```
/// use fftbench_benchmark::{CsvExporter, SweepResult};
/// use fftbench_core::TestConfiguration;
///
/// let result = SweepResult::new(&TestConfiguration::default(), "RustFFT", 1);
/// let csv = CsvExporter::to_string(&result);
/// assert!(csv.starts_with("width,height,"));
/// ```
pub struct CsvExporter;

impl CsvExporter {
    /// Exports the sweep result to a CSV string.
    pub fn to_string(result: &SweepResult) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "width,height,log2_samples,repetition,time_s,ctgs"
        );
        for line in &result.lines {
            let _ = writeln!(
                output,
                "{},{},{},{},{:.6},{:.4}",
                line.shape.cols(),
                line.shape.rows(),
                line.log2_total(),
                line.repetition,
                line.elapsed,
                line.rate,
            );
        }

        output
    }

    /// Exports the sweep result to a CSV file.
    pub fn to_file(result: &SweepResult, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, Self::to_string(result))
    }

    /// Writes the sweep result as CSV to a writer.
    pub fn write<W: Write>(result: &SweepResult, mut writer: W) -> io::Result<()> {
        writer.write_all(Self::to_string(result).as_bytes())
    }
}

/// Markdown report generator.
pub struct MarkdownReport;

impl MarkdownReport {
    /// Generates a Markdown report string.
    ///
    /// # Example
    ///
    /// ```
    /// use fftbench_benchmark::{MarkdownReport, SweepResult, TimingLine};
    /// use fftbench_core::{Shape, TestConfiguration};
    ///
    /// let mut result = SweepResult::new(&TestConfiguration::default(), "RustFFT", 2);
    /// result.add_line(TimingLine {
    ///     shape: Shape::square(64).unwrap(),
    ///     repetition: 20,
    ///     elapsed: 0.5,
    ///     rate: 1.25,
    /// });
    ///
    /// let md = MarkdownReport::to_string(&result);
    /// assert!(md.contains("# FFT Benchmark: Two-dimension real"));
    /// assert!(md.contains("| 64 | 64 | 2^12 | 20 | 0.500000 | 1.250 |"));
    /// ```
    pub fn to_string(result: &SweepResult) -> String {
        let mut output = String::new();

        let _ = writeln!(output, "# FFT Benchmark: {}", result.description);
        let _ = writeln!(output);

        let _ = writeln!(output, "- **Engine**: {}", result.engine);
        let _ = writeln!(output, "- **Precision**: {}", result.precision);
        let _ = writeln!(output, "- **Options**: {}", result.options);
        let _ = writeln!(output, "- **Timing**: {}", result.timing);
        let _ = writeln!(output, "- **Loops**: {}", result.loops);
        let _ = writeln!(output, "- **Threads**: {}", result.threads);
        let _ = writeln!(output);

        let _ = writeln!(output, "## Results");
        let _ = writeln!(output);
        if result.lines.is_empty() {
            let _ = writeln!(output, "*No sizes completed.*");
            return output;
        }

        let _ = writeln!(
            output,
            "| Width | Height | Samples | Repetition | {} time (s) | CTGs |",
            result.timing
        );
        let _ = writeln!(
            output,
            "|-------|--------|---------|------------|---------------|------|"
        );
        for line in &result.lines {
            let _ = writeln!(
                output,
                "| {} | {} | 2^{} | {} | {:.6} | {:.3} |",
                line.shape.cols(),
                line.shape.rows(),
                line.log2_total(),
                line.repetition,
                line.elapsed,
                line.rate,
            );
        }

        if let Some(best) = result.best_rate() {
            let _ = writeln!(output);
            let _ = writeln!(
                output,
                "Peak: **{:.3} CTGs** at {} x {}",
                best.rate,
                best.shape.cols(),
                best.shape.rows()
            );
        }

        output
    }

    /// Writes the Markdown report to a file.
    pub fn to_file(result: &SweepResult, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, Self::to_string(result))
    }

    /// Writes the Markdown report to a writer.
    pub fn write<W: Write>(result: &SweepResult, mut writer: W) -> io::Result<()> {
        writer.write_all(Self::to_string(result).as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fftbench_core::{Shape, TestConfiguration};

    fn sample() -> SweepResult {
        let mut result = SweepResult::new(&TestConfiguration::default(), "RustFFT", 4);
        result.add_line(TimingLine {
            shape: Shape::square(1024).unwrap(),
            repetition: 10,
            elapsed: 12.5,
            rate: 0.875,
        });
        result
    }

    #[test]
    fn test_header_names_clock() {
        let wall = table_header(TimingMode::Wall);
        assert!(wall.starts_with("  Width | Height | Samples | Wall time (s) |  CTGs \n"));
        assert!(wall.ends_with(" -------+--------+---------+---------------+---------\n"));
        assert!(table_header(TimingMode::User).contains("User time (s)"));
    }

    #[test]
    fn test_row_alignment() {
        let result = sample();
        assert_eq!(
            table_row(&result.lines[0]),
            "   2^10 |  2^10  |   2^20  |    12.500     |  0.875"
        );
    }

    #[test]
    fn test_banner() {
        let banner = banner(&sample());
        assert!(banner.contains("FFT Engine  : RustFFT"));
        assert!(banner.contains("Threads     : 4"));
        assert!(banner.contains("Signal type : Random"));
    }

    #[test]
    fn test_csv_rows() {
        let csv = CsvExporter::to_string(&sample());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "1024,1024,20,10,12.500000,0.8750");
    }

    #[test]
    fn test_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        CsvExporter::to_file(&sample(), &path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("1024,1024"));
    }

    #[test]
    fn test_markdown_empty() {
        let result = SweepResult::new(&TestConfiguration::default(), "RustFFT", 1);
        let md = MarkdownReport::to_string(&result);
        assert!(md.contains("*No sizes completed.*"));

        let mut buf = Vec::new();
        MarkdownReport::write(&sample(), &mut buf).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("Peak: **0.875 CTGs**"));
    }
}
