//! Result retrieval
//!
//! Lists the results of a completed job, downloads each published archive
//! into the outputs directory and unpacks it into `<outputs>/<job-id>/`.

use reqwest::Client;
use skiff_client::JobsApi;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::{Result, WorkflowError};
use crate::service::extractor::extract_archive;

/// Downloads and extracts job results
pub struct ResultRetriever {
    http: Client,
    outputs_dir: PathBuf,
}

impl ResultRetriever {
    /// Creates a retriever writing under `outputs_dir`
    pub fn new(outputs_dir: impl Into<PathBuf>) -> Self {
        Self {
            http: Client::new(),
            outputs_dir: outputs_dir.into(),
        }
    }

    /// Where the archive for the `index`-th result item of `job_id` is stored
    pub fn archive_path(&self, job_id: &str, index: usize) -> PathBuf {
        let file_name = match index {
            0 => format!("{}.tar.gz", job_id),
            n => format!("{}.{}.tar.gz", job_id, n),
        };
        self.outputs_dir.join(file_name)
    }

    /// Where the results of `job_id` are extracted
    pub fn extraction_dir(&self, job_id: &str) -> PathBuf {
        self.outputs_dir.join(job_id)
    }

    /// Retrieves all results of `job_id`
    ///
    /// Every result item is checked for a download URL before anything is
    /// written locally. `deadline` bounds extraction, which runs off the async
    /// runtime; callers bound the network calls themselves.
    ///
    /// # Returns
    /// The directory the results were extracted into
    pub async fn retrieve(
        &self,
        api: &dyn JobsApi,
        job_id: &str,
        deadline: Instant,
    ) -> Result<PathBuf> {
        check_job_id(job_id)?;

        info!("Retrieving results for job {}", job_id);
        let listing = api
            .list_results(job_id)
            .await
            .map_err(WorkflowError::Results)?;

        if listing.items.is_empty() {
            return Err(WorkflowError::MalformedResult(format!(
                "job {} published no results",
                job_id
            )));
        }

        let urls = listing
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.download_url().ok_or_else(|| {
                    WorkflowError::MalformedResult(format!(
                        "result item {} ({}) has no download URL",
                        i, item.kind
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if !listing.next_token.is_empty() {
            debug!("Ignoring further result pages for job {}", job_id);
        }

        fs::create_dir_all(&self.outputs_dir)
            .await
            .map_err(WorkflowError::io(&self.outputs_dir))?;

        let dest = self.extraction_dir(job_id);

        for (index, url) in urls.into_iter().enumerate() {
            let archive = self.archive_path(job_id, index);
            let bytes = self.download(url, &archive).await?;
            info!("Downloaded {} bytes to {}", bytes, archive.display());

            let files = extract_archive(&archive, &dest, deadline.into_std()).await?;
            debug!("Extracted {} files into {}", files.len(), dest.display());
        }

        info!("Results extracted to {}", dest.display());
        Ok(dest)
    }

    /// Streams `url` into `path`, returning the number of bytes written
    ///
    /// Nothing is created at `path` unless the server answers with a success
    /// status, and a partially written file is removed if the body breaks off.
    pub async fn download(&self, url: &str, path: &Path) -> Result<u64> {
        debug!("Downloading {}", url);

        let transport = |source| WorkflowError::DownloadTransport {
            url: url.to_string(),
            source,
        };

        let mut response = self.http.get(url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkflowError::Download {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = File::create(path).await.map_err(WorkflowError::io(path))?;

        let streamed = async {
            let mut written = 0u64;
            while let Some(chunk) = response.chunk().await.map_err(transport)? {
                file.write_all(&chunk)
                    .await
                    .map_err(WorkflowError::io(path))?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(WorkflowError::io(path))?;
            Ok::<_, WorkflowError>(written)
        }
        .await;

        if streamed.is_err() {
            drop(file);
            if let Err(e) = fs::remove_file(path).await {
                warn!("Failed to remove partial download {}: {}", path.display(), e);
            }
        }

        streamed
    }
}

/// Rejects job IDs that cannot be used as a single file name component
fn check_job_id(job_id: &str) -> Result<()> {
    let unsafe_id = job_id.is_empty()
        || job_id == "."
        || job_id == ".."
        || job_id.contains(['/', '\\', '\0']);

    if unsafe_id {
        return Err(WorkflowError::MalformedResult(format!(
            "job ID {:?} cannot be used as a file name",
            job_id
        )));
    }

    Ok(())
}
