use std::{collections::HashSet, future::Future, path::Path, pin::Pin, sync::Arc};
use tokio::{fs::OpenOptions, sync::Mutex};

use super::{
    error::{Error, ShellFsResult},
    fs::ReadDir,
    transport::{CopyTransport, ShellTransport, StatTransport},
};
use crate::{
    escape::escape_path,
    listing::{default_ignore_names, Dialect, Entry, EntryKind},
    stat::PathStat,
};

const DEFAULT_CREATE_MODE: u32 = 0o644;

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// High-level client for introspecting and manipulating a remote filesystem
/// through plain shell commands.
///
/// The transport handed to [`ShellFsSession::new`] must already be
/// authenticated; connection setup and teardown belong to the transport
/// implementation. The handle is guarded by a mutex so that a session never
/// has two commands in flight at once; callers needing concurrent remote
/// operations open independent sessions.
pub struct ShellFsSession<T> {
    transport: Arc<Mutex<T>>,
    dialect: Dialect,
}

impl<T: ShellTransport> ShellFsSession<T> {
    /// Creates a session by probing the remote dialect once with `uname`.
    ///
    /// A probe result that is not case-insensitively `"windows"` classifies
    /// the remote as POSIX-like. A failing probe is fatal.
    pub async fn new(transport: T) -> ShellFsResult<Self> {
        let mut session = Self::with_dialect(transport, Dialect::Posix);

        let uname = session.exec("uname").await?;
        if uname.eq_ignore_ascii_case("windows") {
            session.dialect = Dialect::Windows;
        }
        debug!("remote dialect: {}", session.dialect);

        Ok(session)
    }

    /// Creates a session with a known dialect, skipping the probe.
    pub fn with_dialect(transport: T, dialect: Dialect) -> Self {
        Self {
            transport: Arc::new(Mutex::new(transport)),
            dialect,
        }
    }

    /// The dialect this session parses listings with.
    #[must_use]
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Overrides the cached dialect, e.g. with a [`sniff_dialect`] result on
    /// remotes without `uname`.
    ///
    /// [`sniff_dialect`]: ShellFsSession::sniff_dialect
    pub fn set_dialect(&mut self, dialect: Dialect) {
        self.dialect = dialect;
    }

    /// Runs a remote shell command and returns its trimmed standard output.
    pub async fn exec(&self, command: &str) -> ShellFsResult<String> {
        self.exec_with(command, true).await
    }

    /// Runs a remote shell command, awaiting until both of its output
    /// streams close.
    ///
    /// Classification is by standard error alone: any output there fails the
    /// call with [`Error::Command`] carrying the text verbatim, regardless
    /// of the command's exit status. Otherwise the captured standard output
    /// is returned, trimmed of surrounding whitespace when `trim_output`.
    pub async fn exec_with(&self, command: &str, trim_output: bool) -> ShellFsResult<String> {
        debug!("exec: {command}");

        let mut transport = self.transport.lock().await;
        let streams = transport.exec(command).await?;
        let (stdout, stderr) = streams.collect().await?;
        drop(transport);

        if !stderr.is_empty() {
            return Err(Error::Command(
                String::from_utf8_lossy(&stderr).into_owned(),
            ));
        }

        let stdout = String::from_utf8_lossy(&stdout);
        Ok(if trim_output {
            stdout.trim().to_owned()
        } else {
            stdout.into_owned()
        })
    }

    /// Returns the remote working directory (`pwd`).
    pub async fn current_dir(&self) -> ShellFsResult<String> {
        self.exec("pwd").await
    }

    /// Raw name listing (`ls -a`, `ls -aR` when `recursive`), unparsed.
    pub async fn list_names<P: Into<String>>(
        &self,
        path: P,
        recursive: bool,
    ) -> ShellFsResult<Vec<String>> {
        let command = format!(
            "ls -a{} {}",
            recursive_flag(recursive),
            escape_path(&path.into())
        );
        Ok(self.exec(&command).await?.lines().map(ToOwned::to_owned).collect())
    }

    /// Raw detailed listing (`ls -la`, `ls -laR` when `recursive`), unparsed.
    pub async fn list_raw<P: Into<String>>(
        &self,
        path: P,
        recursive: bool,
    ) -> ShellFsResult<Vec<String>> {
        let command = format!(
            "ls -la{} {}",
            recursive_flag(recursive),
            escape_path(&path.into())
        );
        Ok(self.exec(&command).await?.lines().map(ToOwned::to_owned).collect())
    }

    /// Lists one directory as parsed entries, in listing order.
    pub async fn read_dir<P: Into<String>>(&self, path: P) -> ShellFsResult<ReadDir> {
        self.read_dir_filtered(path, false, &default_ignore_names())
            .await
    }

    /// Lists a directory tree as parsed entries, depth-first pre-order.
    pub async fn read_dir_all<P: Into<String>>(&self, path: P) -> ShellFsResult<ReadDir> {
        self.read_dir_filtered(path, true, &default_ignore_names())
            .await
    }

    /// Lists a directory (or tree, when `recursive`) with a caller-supplied
    /// ignore-set.
    ///
    /// One listing command is issued per directory, strictly sequentially.
    /// A failure to list any directory along the walk aborts the whole
    /// operation; there is no partial result.
    pub async fn read_dir_filtered<P: Into<String>>(
        &self,
        path: P,
        recursive: bool,
        ignore_names: &HashSet<String>,
    ) -> ShellFsResult<ReadDir> {
        let mut entries = Vec::new();
        self.walk(&mut entries, path.into(), recursive, ignore_names)
            .await?;
        Ok(ReadDir::from(entries))
    }

    // A subdirectory's entries splice in right after its own entry, before
    // the next sibling. Recursion keys on EntryKind::Dir, so symlinks are
    // never followed even when their target is a directory.
    fn walk<'a>(
        &'a self,
        out: &'a mut Vec<Entry>,
        path: String,
        recursive: bool,
        ignore_names: &'a HashSet<String>,
    ) -> BoxFuture<'a, ShellFsResult<()>> {
        Box::pin(async move {
            let lines = self.list_raw(path.as_str(), false).await?;

            for line in &lines {
                let Some(entry) = self.dialect.parse_line(line, &path, ignore_names)? else {
                    continue;
                };

                let descend = recursive && entry.kind == EntryKind::Dir;
                let child = entry.path.clone();
                out.push(entry);

                if descend {
                    self.walk(out, child, recursive, ignore_names).await?;
                }
            }

            Ok(())
        })
    }

    /// Guesses the remote dialect from a detailed listing of `path`.
    ///
    /// Best-effort fallback for remotes where the `uname` probe is
    /// unavailable; apply the result with [`ShellFsSession::set_dialect`].
    pub async fn sniff_dialect<P: Into<String>>(&self, path: P) -> ShellFsResult<Dialect> {
        let lines = self.list_raw(path, false).await?;
        Ok(Dialect::from_listing(&lines))
    }

    /// Creates a remote directory, tolerating one that already exists.
    pub async fn create_dir<P: Into<String>>(&self, path: P) -> ShellFsResult<()> {
        self.create_dir_with(path, true).await
    }

    /// Creates a remote directory.
    ///
    /// With `ignore_existing`, a command error mentioning an existing target
    /// is non-fatal; every other error still propagates.
    pub async fn create_dir_with<P: Into<String>>(
        &self,
        path: P,
        ignore_existing: bool,
    ) -> ShellFsResult<()> {
        let path = path.into();
        match self.exec(&format!("mkdir {}", escape_path(&path))).await {
            Err(Error::Command(stderr)) if ignore_existing && stderr_mentions(&stderr, "exists") => {
                debug!("create_dir {path:?}: already exists, ignored");
                Ok(())
            }
            result => result.map(|_| ()),
        }
    }

    /// Removes a remote file or directory tree (`rm -fr`).
    pub async fn remove_file<P: Into<String>>(&self, path: P) -> ShellFsResult<()> {
        self.remove_file_with(path, false).await
    }

    /// Removes a remote file or directory tree.
    ///
    /// With `ignore_missing`, a command error mentioning a missing target is
    /// non-fatal; every other error still propagates.
    pub async fn remove_file_with<P: Into<String>>(
        &self,
        path: P,
        ignore_missing: bool,
    ) -> ShellFsResult<()> {
        let path = path.into();
        match self.exec(&format!("rm -fr {}", escape_path(&path))).await {
            Err(Error::Command(stderr))
                if ignore_missing && stderr_mentions(&stderr, "no such file") =>
            {
                debug!("remove_file {path:?}: already absent, ignored");
                Ok(())
            }
            result => result.map(|_| ()),
        }
    }

    /// Removes a remote directory. Alias of [`ShellFsSession::remove_file`];
    /// the removal command does not distinguish the two.
    pub async fn remove_dir<P: Into<String>>(&self, path: P) -> ShellFsResult<()> {
        self.remove_file(path).await
    }

    /// Renames a file or directory (`mv -T`).
    pub async fn rename<O, N>(&self, oldpath: O, newpath: N) -> ShellFsResult<()>
    where
        O: Into<String>,
        N: Into<String>,
    {
        let command = format!(
            "mv -T {} {}",
            escape_path(&oldpath.into()),
            escape_path(&newpath.into())
        );
        self.exec(&command).await.map(|_| ())
    }

    /// Creates a symlink at `link` pointing to `target` (`ln -s`).
    pub async fn symlink<S, L>(&self, target: S, link: L) -> ShellFsResult<()>
    where
        S: Into<String>,
        L: Into<String>,
    {
        let command = format!(
            "ln -s {} {}",
            escape_path(&target.into()),
            escape_path(&link.into())
        );
        self.exec(&command).await.map(|_| ())
    }

    /// Queries structured metadata for a remote path, bypassing the
    /// text-listing path entirely.
    pub async fn metadata<P: Into<String>>(&self, path: P) -> ShellFsResult<PathStat>
    where
        T: StatTransport,
    {
        Ok(self.transport.lock().await.stat(&path.into()).await?)
    }

    /// Uploads a local file, created remotely with mode `0o644`.
    pub async fn upload_file<P: Into<String>>(
        &self,
        local_path: &Path,
        remote_path: P,
    ) -> ShellFsResult<()>
    where
        T: CopyTransport,
    {
        self.upload_file_with_mode(local_path, remote_path, DEFAULT_CREATE_MODE)
            .await
    }

    /// Uploads a local file, created remotely with the given mode.
    pub async fn upload_file_with_mode<P: Into<String>>(
        &self,
        local_path: &Path,
        remote_path: P,
        mode: u32,
    ) -> ShellFsResult<()>
    where
        T: CopyTransport,
    {
        Ok(self
            .transport
            .lock()
            .await
            .copy_file_in(local_path, &remote_path.into(), mode)
            .await?)
    }

    /// Downloads a remote file into `local_path`.
    ///
    /// The local file is created when missing; a destination that cannot be
    /// opened for writing fails with [`Error::LocalFile`] before anything is
    /// transferred.
    pub async fn download_file<P: Into<String>>(
        &self,
        remote_path: P,
        local_path: &Path,
    ) -> ShellFsResult<()>
    where
        T: CopyTransport,
    {
        if let Err(err) = OpenOptions::new()
            .write(true)
            .create(true)
            .open(local_path)
            .await
        {
            return Err(Error::LocalFile(format!("{}: {err}", local_path.display())));
        }

        Ok(self
            .transport
            .lock()
            .await
            .copy_file_out(&remote_path.into(), local_path)
            .await?)
    }
}

fn recursive_flag(recursive: bool) -> &'static str {
    if recursive {
        "R"
    } else {
        ""
    }
}

// Matches the diagnostic shape `tool: context: reason`: the needle must
// appear, case-insensitively, in a colon-delimited segment after the first.
fn stderr_mentions(stderr: &str, needle: &str) -> bool {
    let lower = stderr.to_ascii_lowercase();
    lower.split(':').skip(1).any(|segment| segment.contains(needle))
}
