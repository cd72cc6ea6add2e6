use owo_colors::OwoColorize;
use pocketmark::export::ExportReport;
use pocketmark::merge::EXPORT_FOLDER_NAME;
use pocketmark::utils::truncate;

const TITLE_WIDTH: usize = 70;

pub trait Render {
    fn render(&self) -> String;
}

pub struct PlainReport<'a>(pub &'a ExportReport);

pub struct ColorizeReport<'a>(pub &'a ExportReport);

impl<'a> Render for PlainReport<'a> {
    fn render(&self) -> String {
        let report = self.0;
        let mut s = String::new();
        if report.dry_run {
            s.push_str("Dry run: nothing was written\n");
        }
        s.push_str(&format!(
            "Exported {} item(s) into {}/{} ({})\n",
            report.merged,
            report.browser.display_name(),
            EXPORT_FOLDER_NAME,
            report.store_path.display()
        ));
        if let Some(backup) = &report.backup_path {
            s.push_str(&format!("Backup: {}\n", backup.display()));
        }
        if !report.skipped.is_empty() {
            s.push_str(&format!("Skipped {} item(s) without a URL:\n", report.skipped.len()));
            for item in &report.skipped {
                s.push_str(&format!(
                    "  - {} ({})\n",
                    truncate(&item.title, TITLE_WIDTH),
                    item.item_id
                ));
            }
        }
        s
    }
}

impl<'a> Render for ColorizeReport<'a> {
    fn render(&self) -> String {
        let report = self.0;
        let mut s = String::new();
        if report.dry_run {
            s.push_str(&format!("{}\n", "Dry run: nothing was written".yellow()));
        }
        s.push_str(&format!(
            "{} Exported {} item(s) into {} ({})\n",
            "✓".green(),
            report.merged.to_string().bold(),
            format!("{}/{}", report.browser.display_name(), EXPORT_FOLDER_NAME).bright_blue(),
            report.store_path.display()
        ));
        if let Some(backup) = &report.backup_path {
            s.push_str(&format!("  {} {}\n", "Backup:".dimmed(), backup.display()));
        }
        if !report.skipped.is_empty() {
            s.push_str(&format!(
                "{} Skipped {} item(s) without a URL:\n",
                "!".yellow(),
                report.skipped.len()
            ));
            for item in &report.skipped {
                s.push_str(&format!(
                    "  {} {} ({})\n",
                    "-".red(),
                    truncate(&item.title, TITLE_WIDTH),
                    item.item_id.dimmed()
                ));
            }
        }
        s
    }
}
