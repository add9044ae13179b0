/// Package information extracted from Cargo.toml at compile time
pub struct VersionInfo {
    pub version: &'static str,
    pub name: &'static str,
    pub repository: &'static str,
}

impl VersionInfo {
    pub const fn get() -> VersionInfo {
        VersionInfo {
            version: env!("CARGO_PKG_VERSION"),
            name: env!("CARGO_PKG_NAME"),
            repository: env!("CARGO_PKG_REPOSITORY"),
        }
    }

    /// `"ring-bridge v0.1.0"`
    pub fn banner(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }
}
