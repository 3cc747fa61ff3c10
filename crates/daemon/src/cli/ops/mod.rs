pub mod daemon;
pub mod health;
pub mod init;
pub mod login;
pub mod share;
pub mod signup;
pub mod version;

pub use daemon::Daemon;
pub use health::Health;
pub use init::Init;
pub use login::Login;
pub use share::Share;
pub use signup::Signup;
pub use version::Version;
