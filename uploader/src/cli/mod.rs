pub mod bugreport;
pub mod client;
pub mod server;
pub mod version;

pub const SERVER_SUBCOMMAND: &str = "server";
pub const SERVER_DESCRIPTION: &str = "Run the upload server";

pub const VERSION_SUBCOMMAND: &str = "version";
pub const VERSION_DESCRIPTION: &str = "Display the version and build information";

pub const BUGREPORT_SUBCOMMAND: &str = "bugreport";
pub const BUGREPORT_DESCRIPTION: &str = "Collect information about the system and the environment for a bug report";

pub const UPLOAD_SUBCOMMAND: &str = "upload";
pub const UPLOAD_DESCRIPTION: &str = "Validate image files and upload the accepted ones";

pub const IMAGES_SUBCOMMAND: &str = "images";
pub const IMAGES_DESCRIPTION: &str = "Show one page of uploaded images";

pub const DELETE_SUBCOMMAND: &str = "delete";
pub const DELETE_DESCRIPTION: &str = "Delete an uploaded image by file name (or list position with --local)";

pub const BROWSE_SUBCOMMAND: &str = "browse";
pub const BROWSE_DESCRIPTION: &str = "Interactive upload and gallery session";

pub const DEFAULT_URI: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILTER: &str = "uploader=info,server=info,client=info";
