//! Shared test infrastructure for integration tests
//!
//! Spawns the real ydisk_web binary against a filesystem-backed disk in a
//! temp directory and provides a browser-like reqwest client.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::sleep;

/// Port counter to avoid conflicts between tests.
static PORT_COUNTER: AtomicU16 = AtomicU16::new(19400);

/// Test server wrapper that spawns a real ydisk_web binary
pub struct TestServer {
    process: Child,
    port: u16,
    _temp: TempDir,
    data_dir: PathBuf,
}

impl TestServer {
    /// Start a test server with filesystem backend
    pub async fn filesystem() -> Self {
        let port = PORT_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp.path().join("disk");

        let config = format!(
            "listen_addr = \"127.0.0.1:{}\"\n\n[backend]\ntype = \"filesystem\"\npath = \"{}\"\n",
            port,
            data_dir.display()
        );
        let config_path = temp.path().join("test.toml");
        std::fs::write(&config_path, &config).expect("Failed to write test config");

        let process = Command::new(env!("CARGO_BIN_EXE_ydisk_web"))
            .env("YDW_CONFIG", &config_path)
            .env("RUST_LOG", "ydisk_web=warn")
            .spawn()
            .expect("Failed to start server");

        let mut server = Self {
            process,
            port,
            _temp: temp,
            data_dir,
        };
        server.wait_ready().await;
        server
    }

    async fn wait_ready(&mut self) {
        let addr = format!("127.0.0.1:{}", self.port);
        for _ in 0..150 {
            if std::net::TcpStream::connect(&addr).is_ok() {
                sleep(Duration::from_millis(100)).await;
                return;
            }

            if let Ok(Some(status)) = self.process.try_wait() {
                panic!("Server exited before becoming ready: {}", status);
            }

            sleep(Duration::from_millis(100)).await;
        }

        let _ = self.process.kill();
        panic!("Timed out waiting for server on {}", addr);
    }

    /// Get the HTTP endpoint URL
    pub fn endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint(), path)
    }

    /// Directory backing the served disk
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Place a file directly on the served disk
    pub fn seed_file(&self, rel: &str, data: &[u8]) {
        let path = self.data_dir.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create seed dir");
        }
        std::fs::write(path, data).expect("Failed to seed file");
    }

    pub fn seed_dir(&self, rel: &str) {
        std::fs::create_dir_all(self.data_dir.join(rel)).expect("Failed to seed dir");
    }

    pub fn has_file(&self, rel: &str) -> bool {
        self.data_dir.join(rel).exists()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.process.kill();
    }
}

// === Shared HTTP helpers (reqwest) ===

/// Client that keeps the session cookie and does not follow redirects,
/// so tests can assert on the 302 itself.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build client")
}

/// Assert a response is the 302 back to the file list.
pub fn assert_redirect_to_files(resp: &reqwest::Response) {
    assert_eq!(resp.status().as_u16(), 302, "expected 302, got {}", resp.status());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert_eq!(location, "/files");
}

/// Fetch the file list page body.
pub async fn files_page(client: &reqwest::Client, server: &TestServer) -> String {
    let resp = client.get(server.url("/files")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    resp.text().await.unwrap()
}

/// Text between `prefix` and the next `"` in a rendered page.
pub fn attr_after(html: &str, prefix: &str) -> String {
    let start = html
        .find(prefix)
        .unwrap_or_else(|| panic!("{} not found in page", prefix))
        + prefix.len();
    let len = html[start..].find('"').expect("unterminated attribute");
    html[start..start + len].to_string()
}

/// POST a url-encoded form and return the response.
pub async fn post_form(
    client: &reqwest::Client,
    server: &TestServer,
    path: &str,
    form: &[(&str, &str)],
) -> reqwest::Response {
    client
        .post(server.url(path))
        .form(form)
        .send()
        .await
        .expect("POST failed")
}

/// Upload one file through the multipart form.
pub async fn upload(
    client: &reqwest::Client,
    server: &TestServer,
    filename: &str,
    data: Vec<u8>,
) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(data).file_name(filename.to_string());
    let form = reqwest::multipart::Form::new().part("file", part);
    client
        .post(server.url("/files/upload"))
        .multipart(form)
        .send()
        .await
        .expect("Upload failed")
}
