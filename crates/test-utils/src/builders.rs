#![allow(dead_code)]

use assetflow::config::{CompositeTaskConfig, ConfigFile, RawConfigFile, WatchBindingConfig};
use assetflow::errors::Result;
use assetflow::types::{FontFormat, OutputStyle};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn root(mut self, root: &str) -> Self {
        self.config.project.root = root.to_string();
        self
    }

    pub fn dist(mut self, dist: &str) -> Self {
        self.config.project.dist = dist.to_string();
        self
    }

    pub fn server(mut self, host: &str, port: u16) -> Self {
        self.config.server.host = host.to_string();
        self.config.server.port = port;
        self
    }

    pub fn output_style(mut self, style: OutputStyle) -> Self {
        self.config.styles.output_style = style;
        self
    }

    /// Fastest AVIF preset, so image tests stay quick.
    pub fn fast_avif(mut self) -> Self {
        self.config.images.avif_speed = 10;
        self
    }

    pub fn font_formats(mut self, formats: &[FontFormat]) -> Self {
        self.config.fonts.formats = formats.to_vec();
        self
    }

    pub fn sprite_example(mut self, example: bool) -> Self {
        self.config.sprite.example = example;
        self
    }

    pub fn watch(mut self, binding: WatchBindingConfig) -> Self {
        self.config.watch.get_or_insert_with(Vec::new).push(binding);
        self
    }

    pub fn sequence(mut self, name: &str, members: &[&str]) -> Self {
        self.config.task.insert(
            name.to_string(),
            CompositeTaskConfig {
                sequence: Some(members.iter().map(|m| m.to_string()).collect()),
                parallel: None,
            },
        );
        self
    }

    pub fn parallel(mut self, name: &str, members: &[&str]) -> Self {
        self.config.task.insert(
            name.to_string(),
            CompositeTaskConfig {
                sequence: None,
                parallel: Some(members.iter().map(|m| m.to_string()).collect()),
            },
        );
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
