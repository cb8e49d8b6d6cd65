use std::{
    io::{self, BufRead, BufReader, BufWriter, Read, Write},
    net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs},
    sync::Arc,
    thread,
};

use crate::{
    fs::FileSystem,
    protocol::{Dispatcher, Response},
    utils::session_id,
};

/// 文件服务器：每个连接一个线程，所有连接共享同一个卷
pub struct FileServer {
    listener: TcpListener,
    dispatcher: Dispatcher,
}

impl FileServer {
    pub fn bind(addr: impl ToSocketAddrs, fs: Arc<FileSystem>) -> io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
            dispatcher: Dispatcher::new(fs),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// 接受连接直到监听套接字出错
    pub fn run(self) -> io::Result<()> {
        log::info!("Server started. Listening on {}...", self.local_addr()?);

        for stream in self.listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(e) => {
                    log::warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let dispatcher = self.dispatcher.clone();
            thread::spawn(move || serve_client(stream, dispatcher));
        }
        Ok(())
    }
}

fn serve_client(stream: TcpStream, dispatcher: Dispatcher) {
    let session = session_id();
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    log::info!("[{}] Handling client {}", session, peer);

    let result = stream
        .try_clone()
        .and_then(|read_half| {
            handle_connection(
                BufReader::new(read_half),
                BufWriter::new(stream),
                &dispatcher,
                &session,
            )
        });

    match result {
        Ok(()) => log::info!("[{}] Closed client {}", session, peer),
        Err(e) => log::error!("[{}] Connection to {} failed: {}", session, peer, e),
    }
}

/// 处理一个连接上的所有请求行，每个请求恰好回一行
///
/// 在 EOF、流读写出错或 Abort 响应之后返回。
/// 超过 `Dispatcher::max_line_len` 的请求行回一条错误后结束连接。
pub fn handle_connection<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    dispatcher: &Dispatcher,
    session: &str,
) -> io::Result<()> {
    let limit = dispatcher.max_line_len();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader
            .by_ref()
            .take(limit as u64 + 1)
            .read_until(b'\n', &mut buf)?
            == 0
        {
            return Ok(());
        }

        let response = if buf.len() > limit && buf.last() != Some(&b'\n') {
            Response::Abort(format!("request line exceeds {} bytes", limit))
        } else {
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\r', '\n']);
            log::debug!("[{}] Received: {}", session, line);
            dispatcher.handle_line(line)
        };
        writeln!(writer, "{}", response)?;
        writer.flush()?;

        if response.closes_connection() {
            log::warn!("[{}] Closing connection after: {}", session, response);
            return Ok(());
        }
    }
}
