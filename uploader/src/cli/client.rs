use std::io::Write;
use std::sync::Arc;

use clap::ArgMatches;
use client::{
    render, Candidate, ClientError, Gallery, GalleryView, Key, LocalStorage, LocalStore, Navigator,
    RecordStore, ServerStore, Store, UploadController, View,
};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use super::DEFAULT_URI;

const BROWSE_HELP: &str = "\
commands:
  upload <FILE>...   validate and upload files
  images             open the images view
  page <N>           go to page N
  next | prev        move to the next or previous page
  delete <KEY>       delete the record shown with KEY
  tab                switch to the other view
  f5 | esc           back to the upload view
  help               show this help
  quit               leave";

/// Server storage at `--uri`, or the JSON file given with `--local`.
pub fn open_store(matches: &ArgMatches) -> Result<Store, ClientError> {
    if let Some(local) = matches.get_one::<String>("local") {
        let storage = Arc::new(LocalStorage::new(local));
        return Ok(Store::Local(LocalStore::new(storage)));
    }
    let uri = matches
        .get_one::<String>("uri")
        .map_or(DEFAULT_URI, String::as_str);
    let mut store = ServerStore::new(uri)?;
    if let Some(journal) = matches.get_one::<String>("journal") {
        store = store.with_journal(Arc::new(LocalStorage::new(journal)));
    }
    Ok(Store::Server(store))
}

pub async fn upload(matches: &ArgMatches) {
    let Some(store) = store_or_report(matches) else {
        return;
    };
    let files: Vec<&String> = matches
        .get_many::<String>("files")
        .map(|values| values.collect())
        .unwrap_or_default();
    let mut controller = UploadController::new(store);
    submit(&mut controller, files.into_iter().map(String::as_str)).await;
}

pub async fn images(matches: &ArgMatches) {
    let Some(store) = store_or_report(matches) else {
        return;
    };
    let page = matches.get_one::<usize>("page").copied().unwrap_or(1);
    let mut gallery = Gallery::new(store);
    show(&gallery.go_to(page).await);
}

pub async fn delete(matches: &ArgMatches) {
    let Some(store) = store_or_report(matches) else {
        return;
    };
    let input = matches
        .get_one::<String>("key")
        .map(String::as_str)
        .unwrap_or_default();
    let page = matches.get_one::<usize>("page").copied().unwrap_or(1);

    let Some(key) = store.parse_key(input) else {
        eprintln!("invalid key '{input}'");
        return;
    };
    let mut gallery = Gallery::new(store);
    // the page clamp needs the total of a previous fetch
    gallery.go_to(page).await;
    match gallery.delete(&key).await {
        Ok(view) => {
            println!("{key} deleted");
            show(&view);
        }
        Err(e) => eprintln!("delete error: {e}"),
    }
}

pub async fn browse(matches: &ArgMatches) {
    let Some(store) = store_or_report(matches) else {
        return;
    };
    let mut navigator = Navigator::new(View::Upload.path());
    let mut controller = UploadController::new(store.clone());
    let mut gallery = Gallery::new(store.clone());

    println!("{BROWSE_HELP}");
    println!("{}", render::tabs(&navigator.tabs()));

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        print!("{}> ", navigator.current());
        std::io::stdout().flush().unwrap_or_default();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                eprintln!("input error: {e}");
                break;
            }
        };
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => println!("{BROWSE_HELP}"),
            "f5" | "esc" | "escape" => {
                navigator.handle_key(Key::parse(command));
                println!("{}", render::tabs(&navigator.tabs()));
            }
            "tab" => {
                let view = navigator.open(navigator.current().other().path());
                println!("{}", render::tabs(&navigator.tabs()));
                if view == View::Images {
                    show(&gallery.refresh().await);
                }
            }
            "images" => {
                navigator.open(View::Images.path());
                println!("{}", render::tabs(&navigator.tabs()));
                show(&gallery.refresh().await);
            }
            "upload" => {
                if navigator.current() != View::Upload {
                    navigator.open(View::Upload.path());
                    println!("{}", render::tabs(&navigator.tabs()));
                }
                submit(&mut controller, rest.split_whitespace()).await;
            }
            "next" => match gallery.next().await {
                Some(view) => show(&view),
                None => println!("already on the last page"),
            },
            "prev" => match gallery.previous().await {
                Some(view) => show(&view),
                None => println!("already on the first page"),
            },
            "page" => match rest.parse::<usize>() {
                Ok(page) => show(&gallery.go_to(page).await),
                Err(_) => eprintln!("page number expected"),
            },
            "delete" => match store.parse_key(rest) {
                Some(key) => match gallery.delete(&key).await {
                    Ok(view) => show(&view),
                    Err(e) => eprintln!("delete error: {e}"),
                },
                None => eprintln!("invalid key '{rest}'"),
            },
            other => eprintln!("unknown command '{other}', type help"),
        }
    }
}

async fn submit<S: RecordStore>(controller: &mut UploadController<S>, paths: impl Iterator<Item = &str>) {
    let mut candidates = Vec::new();
    for path in paths {
        match Candidate::from_path(path).await {
            Ok(c) => candidates.push(c),
            Err(e) => eprintln!("cannot read {path}: {e}"),
        }
    }
    if candidates.is_empty() {
        println!("no files to upload");
        return;
    }

    let outcomes = controller.submit(candidates).await;
    println!("{}", render::outcomes(&outcomes));
    if let Some(link) = controller.current_upload() {
        println!("Current upload: {link}");
    }
}

fn show(view: &GalleryView) {
    println!("{}", render::gallery(view));
}

fn store_or_report(matches: &ArgMatches) -> Option<Store> {
    match open_store(matches) {
        Ok(store) => Some(store),
        Err(e) => {
            eprintln!("{e}");
            None
        }
    }
}
