use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("readably")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract article content through the Readability Parser API")
        .arg(clap::arg!(<URL> "URL of the page to extract"))
        .arg(clap::arg!(-t --token <TOKEN> "Readability API token").env("READABILITY_TOKEN"))
        .arg(clap::arg!(-c --content <FILE> "Send pre-fetched HTML from a file, or '-' for stdin"))
        .arg(
            clap::arg!(-f --format <FORMAT> "Output format (json, html, markdown, text)")
                .default_value("json")
                .value_parser(["json", "html", "markdown", "md", "text", "txt"]),
        )
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--compact "Print JSON on a single line"))
        .arg(clap::arg!(--frontmatter "Include TOML frontmatter (Markdown only)"))
        .arg(clap::arg!(--"title-heading" "Start Markdown output with the title as a heading"))
        .arg(clap::arg!(--references "Include reference table with all links (Markdown only)"))
        .arg(clap::arg!(--header "Include a title/author header (text only)"))
        .arg(
            clap::arg!(--endpoint <URL> "Extraction endpoint")
                .env("READABILITY_ENDPOINT")
                .default_value("https://readability.com/api/content/v1/parser"),
        )
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for API requests"))
        .arg(clap::arg!(--"dump-failures" "Log raw responses of failed requests"))
        .arg(clap::arg!(-v --verbose "Enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "readably", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "readably", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "readably", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "readably", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
