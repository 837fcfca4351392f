use serde::Serialize;
use std::env;

#[derive(Debug, Clone, Serialize)]
struct VersionInfo {
    pub name: String,
    pub version: String,
    pub os: String,
    pub architecture: String,
    pub max_file_size: u64,
    pub items_per_page: usize,
}

pub fn run(json: bool) {
    let info = VersionInfo {
        name: clap::crate_name!().to_string(),
        version: clap::crate_version!().to_string(),
        os: env::consts::OS.to_string(),
        architecture: env::consts::ARCH.to_string(),
        max_file_size: kernel::MAX_FILE_SIZE,
        items_per_page: kernel::ITEMS_PER_PAGE,
    };

    if json {
        match serde_json::to_string_pretty(&info) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("JSON encode error: {e}"),
        }
        return;
    }

    println!("Name           : {}", info.name);
    println!("Version        : {}", info.version);
    println!("OS             : {}", info.os);
    println!("Architecture   : {}", info.architecture);
    println!("Max file size  : {} bytes", info.max_file_size);
    println!("Page size      : {}", info.items_per_page);
}
