//! Hands finished documents to the user.

use std::{
  future::Future,
  io,
  path::{Component, Path, PathBuf},
};

use idforge_pdf::ExportedDocument;

/// The document-export facility: makes a finished document available under
/// its file name. A failed delivery must not leave a partial file behind.
pub trait Delivery: Send + Sync {
  fn deliver(
    &self,
    document: ExportedDocument,
  ) -> impl Future<Output = io::Result<PathBuf>> + Send + '_;
}

/// Writes documents into a directory, the command-line equivalent of a
/// browser download.
#[derive(Debug, Clone)]
pub struct DirectoryDelivery {
  dir: PathBuf,
}

impl DirectoryDelivery {
  pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

  pub fn dir(&self) -> &Path { &self.dir }
}

impl Delivery for DirectoryDelivery {
  fn deliver(
    &self,
    document: ExportedDocument,
  ) -> impl Future<Output = io::Result<PathBuf>> + Send + '_ {
    async move {
      plain_file_name(&document.file_name)?;
      tokio::fs::create_dir_all(&self.dir).await?;
      let target = self.dir.join(&document.file_name);
      let partial = self.dir.join(format!(".{}.part", document.file_name));

      let written = match tokio::fs::write(&partial, &document.bytes).await {
        Ok(()) => tokio::fs::rename(&partial, &target).await,
        Err(e) => Err(e),
      };
      if let Err(e) = written {
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(e);
      }
      Ok(target)
    }
  }
}

/// Refuse anything but a single ordinary path component, so a document can
/// only ever land directly inside the output directory.
fn plain_file_name(name: &str) -> io::Result<()> {
  let mut parts = Path::new(name).components();
  match (parts.next(), parts.next()) {
    (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
    _ => Err(io::Error::new(
      io::ErrorKind::InvalidInput,
      format!("not a plain file name: {name:?}"),
    )),
  }
}
