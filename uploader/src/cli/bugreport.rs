use bugreport::{
    bugreport,
    collector::{CompileTimeInformation, EnvironmentVariables, OperatingSystem, SoftwareVersion},
    format::Markdown,
};

pub fn run() {
    bugreport!()
        .info(SoftwareVersion::default())
        .info(OperatingSystem::default())
        .info(EnvironmentVariables::list(&[
            "SHELL",
            "TERM",
            "RUST_LOG",
            "UPLOADER_URI",
            "UPLOADER_PORT",
            "UPLOADER_WORKERS",
            "UPLOADER_DATA_DIR",
            "UPLOADER_DB_FILE",
            "UPLOADER_IMAGE_DIR",
            "UPLOADER_FRONTEND_DIR",
            "UPLOADER_MAX_FILE_SIZE",
        ]))
        .info(CompileTimeInformation::default())
        .print::<Markdown>();
}
