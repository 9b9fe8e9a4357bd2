use owo_colors::OwoColorize;
use threadkeep_core::{ArchiveSummary, LocalizeReport, ThreadInfo};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!(
        "\n{} {} {}",
        "Threadkeep".bold().bright_blue(),
        "v".dimmed(),
        VERSION.dimmed()
    );
    eprintln!("{}", "Archive forum threads as offline mirrors\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: u32, total: u32, message: &str) {
    println!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print the thread found on page 1
pub fn print_thread(thread: &ThreadInfo, pages: u32) {
    let noun = if pages == 1 { "page" } else { "pages" };
    print_info(&format!(
        "Found {} {} for {}",
        pages,
        noun,
        thread.display_title().bright_white()
    ));
    if thread.title.is_none() {
        print_warning("No thread title found, using the URL slug as folder name");
    }
}

/// Print per-page asset counts
pub fn print_page_report(report: &LocalizeReport) {
    println!(
        "  {} {}  {} {}  {} {}",
        "assets:".dimmed(),
        report.downloaded.to_string().bright_white(),
        "failed:".dimmed(),
        if report.failed > 0 {
            report.failed.to_string().bright_red().to_string()
        } else {
            report.failed.to_string().dimmed().to_string()
        },
        "links:".dimmed(),
        report.links_rewritten.to_string().bright_white()
    );
}

/// Print the summary of a finished run
pub fn print_summary(summary: &ArchiveSummary) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Backup Summary".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    eprintln!("  {} {}", "Folder:".dimmed(), summary.root.display().bright_white());
    eprintln!("  {} {}", "Pages:".dimmed(), summary.pages_written.to_string().bright_white());
    eprintln!(
        "  {} {} saved, {} failed, {} skipped",
        "Assets:".dimmed(),
        summary.report.downloaded.to_string().bright_white(),
        summary.report.failed.to_string().bright_white(),
        summary.report.skipped.to_string().bright_white()
    );
    eprintln!(
        "  {} {}\n",
        "Links:".dimmed(),
        summary.report.links_rewritten.to_string().bright_white()
    );
}
