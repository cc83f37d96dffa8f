use colored::*;
use terminal_size::{terminal_size, Height, Width};

pub fn print_header(model: &str) {
    let (width, _) = terminal_size().unwrap_or((Width(80), Height(24)));
    let width = width.0 as usize;

    let line = "─".repeat(width);
    println!("{}", line.black().bold());

    let logo = "🧪";
    let name = "Lynn".cyan().bold();
    let version = format!("v{}", env!("CARGO_PKG_VERSION")).black().bold();

    println!("  {} {} {}", logo, name, version);

    let tagline = "  A drug delivery AI for tumor targeting with chemistry knowledge".yellow();
    println!("{}", tagline);
    println!("  {}", format!("model: {}", model).cyan());
    println!("  Type 'exit', 'quit' or 'bye' to end the session.");

    println!("{}", line.black().bold());
}

pub fn print_step(msg: &str) {
    println!("  {} {}", "•".green(), msg);
}

pub fn print_success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg.green());
}

pub fn print_warning(msg: &str) {
    println!("  {} {}", "⚠️ ".yellow().bold(), msg.yellow());
}

pub fn print_error(msg: &str) {
    println!("  {} {}", "❌".red().bold(), msg.red());
}
