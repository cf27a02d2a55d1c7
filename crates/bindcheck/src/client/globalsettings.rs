use std::path::{Path, PathBuf};

use crate::client::output::outputs::Output;
use crate::cluster::ClusterCatalog;

pub struct GlobalSettings {
    clusters_file: Option<PathBuf>,
    printer: Box<dyn Output>,
}

impl GlobalSettings {
    pub fn new(clusters_file: Option<PathBuf>, printer: Box<dyn Output>) -> Self {
        GlobalSettings {
            clusters_file,
            printer,
        }
    }

    pub fn clusters_file(&self) -> Option<&Path> {
        self.clusters_file.as_deref()
    }

    pub fn catalog(&self) -> crate::Result<ClusterCatalog> {
        ClusterCatalog::load(self.clusters_file())
    }

    pub fn printer(&self) -> &dyn Output {
        self.printer.as_ref()
    }
}
