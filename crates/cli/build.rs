use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("threadkeep")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Threadkeep Contributors")
        .about("Back up a forum thread with its images and stylesheets")
        .arg(clap::arg!([URL] "Thread URL (page 1); prompted for when omitted"))
        .arg(
            clap::arg!(-o --output <DIR> "Directory the thread folder is created in")
                .default_value(".")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(--name <NAME> "Folder name to use instead of the thread title"))
        .arg(clap::arg!(--timeout <SECS> "HTTP timeout in seconds").default_value("30"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent for HTTP requests"))
        .arg(clap::arg!(--retries <NUM> "Retries for failed page fetches").default_value("3"))
        .arg(clap::arg!(--"max-pages" <NUM> "Only archive the first NUM pages"))
        .arg(clap::arg!(--"no-avatars" "Keep avatars in images/ instead of images/avatars/"))
        .arg(clap::arg!(--"no-link-rewrite" "Leave links between thread pages pointing at the forum"))
        .arg(clap::arg!(--"no-images" "Do not download images"))
        .arg(clap::arg!(--"no-css" "Do not download stylesheets"))
        .arg(
            clap::arg!(--profile <FILE> "Site profile (JSON) with the forum's selectors and markers")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-v --verbose "Enable debug logging"))
        .arg(
            clap::arg!(--completions <SHELL> "Generate shell completion script")
                .value_parser(["bash", "elvish", "fish", "powershell", "zsh"]),
        );

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "threadkeep", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "threadkeep", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "threadkeep", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "threadkeep", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}
