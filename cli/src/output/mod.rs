pub mod report;

use report::{ColorizeReport, PlainReport, Render};
use pocketmark::export::ExportReport;

/// Print the outcome of an export run to stdout
pub fn print_report(report: &ExportReport, no_color: bool) {
    if no_color {
        print!("{}", PlainReport(report).render());
    } else {
        print!("{}", ColorizeReport(report).render());
    }
}
