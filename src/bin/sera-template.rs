//! Sera template CLI tool
//!
//! A command-line tool for building the Sera App PDF template and auditing
//! its form fields.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use sera_template::audit::run_audit;
use sera_template::fields::DEFAULT_TEMPLATE_PATH;
use sera_template::pdf::{build_template, TemplateOptions};

/// Sera template - build and audit the Sera App PDF form template
#[derive(Parser)]
#[command(name = "sera-template")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Build the template at the default location
    sera-template build

    # Check the template for the Image_1..Image_4 fields
    sera-template audit

    # Build a template whose image placeholders are named fields
    sera-template build --image-fields -o out/template.pdf")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the PDF template with text fields and image placeholders
    Build {
        /// Output PDF file path
        #[arg(short, long, default_value = DEFAULT_TEMPLATE_PATH)]
        output: PathBuf,

        /// Also add named Image_1..Image_4 fields over the image placeholders
        #[arg(long)]
        image_fields: bool,

        /// Title text (centered at the top of the page)
        #[arg(long)]
        title: Option<String>,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// List a template's fields and check for the required image fields
    Audit {
        /// PDF file to inspect
        #[arg(default_value = DEFAULT_TEMPLATE_PATH)]
        input: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            output,
            image_fields,
            title,
            open,
        } => cmd_build(output, image_fields, title, open),
        Commands::Audit { input } => cmd_audit(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(path).spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(path).spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Build the template
fn cmd_build(output: PathBuf, image_fields: bool, title: Option<String>, open: bool) -> Result<()> {
    let defaults = TemplateOptions::default();
    let options = TemplateOptions {
        output_path: output,
        image_fields,
        title: title.unwrap_or_else(|| defaults.title.clone()),
        ..defaults
    };

    println!("Creating PDF template for Sera App / إنشاء قالب PDF لتطبيق سيرا...");

    let template = build_template(&options)
        .with_context(|| format!("failed to create {}", options.output_path.display()))?;

    println!(
        "PDF template created / تم إنشاء قالب PDF: {}",
        template.path.display()
    );
    if !template.image_fields {
        eprintln!(
            "Note: image placeholders are drawn only; rerun with --image-fields to name them"
        );
    }
    println!("Template created successfully / تم إنشاء قالب PDF بنجاح!");
    println!("You can now add the file to the Xcode project / يمكنك الآن إضافة الملف إلى مشروع Xcode.");

    if open {
        open_file(&template.path)?;
    }

    Ok(())
}

/// Audit a template; audit problems are printed, not returned
fn cmd_audit(input: &Path) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_audit(input, &mut out).context("failed to write audit report")?;
    out.flush()?;
    Ok(())
}
