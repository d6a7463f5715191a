use async_trait::async_trait;
use russh::{client, ChannelMsg};
use russh_keys::key;
use russh_shellfs::client::{ExecStreams, ShellFsSession, ShellTransport, TransportError};
use std::io::Cursor;
use std::sync::Arc;

struct Client;

#[async_trait]
impl client::Handler for Client {
    type Error = anyhow::Error;

    async fn check_server_key(
        self,
        server_public_key: &key::PublicKey,
    ) -> Result<(Self, bool), Self::Error> {
        println!("check_server_key: {:?}", server_public_key);
        Ok((self, true))
    }
}

/// Shell transport over russh: one short-lived exec channel per command,
/// stdout from `Data` frames, stderr from `ExtendedData` frames (ext 1).
struct RusshShell {
    handle: client::Handle<Client>,
}

#[async_trait]
impl ShellTransport for RusshShell {
    async fn exec(&mut self, command: &str) -> Result<ExecStreams, TransportError> {
        let mut channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| TransportError::Channel(e.to_string()))?;
        channel
            .exec(true, command)
            .await
            .map_err(|e| TransportError::Channel(e.to_string()))?;

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Some(msg) = channel.wait().await {
            match msg {
                ChannelMsg::Data { ref data } => stdout.extend_from_slice(data),
                ChannelMsg::ExtendedData { ref data, ext: 1 } => stderr.extend_from_slice(data),
                _ => (),
            }
        }

        Ok(ExecStreams {
            stdout: Box::new(Cursor::new(stdout)),
            stderr: Box::new(Cursor::new(stderr)),
        })
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = russh::client::Config::default();
    let sh = Client {};
    let mut session = russh::client::connect(Arc::new(config), ("localhost", 22), sh)
        .await
        .unwrap();
    if session.authenticate_password("root", "pass").await.unwrap() {
        let fs = ShellFsSession::new(RusshShell { handle: session })
            .await
            .unwrap();
        println!("dialect: {}", fs.dialect());
        println!("current dir: {}", fs.current_dir().await.unwrap());

        let path = "./some_kind_of_dir";
        let symlink = "./symlink";

        fs.create_dir(path).await.unwrap();
        fs.symlink(path, symlink).await.unwrap();

        for entry in fs.read_dir_all(".").await.unwrap() {
            println!(
                "{}{} {:>8}  {}",
                entry.type_descriptor, entry.permissions, entry.size, entry.path
            );
        }

        fs.remove_file(symlink).await.unwrap();
        fs.remove_dir(path).await.unwrap();
    }
}
