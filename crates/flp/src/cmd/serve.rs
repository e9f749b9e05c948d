use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use flp_transport::UnixDomainSocket;
use tracing::{debug, info, warn};

use crate::cmd::{device_engine, ServeArgs};
use crate::exit::{transport_error, CliError, CliResult, INTERNAL, SUCCESS};

/// Serve one client connection at a time. State persists across clients.
pub fn run(args: ServeArgs) -> CliResult<i32> {
    let listener =
        UnixDomainSocket::bind(&args.path).map_err(|err| transport_error("bind failed", err))?;
    let (mut protocol, _device) = device_engine(args.engine.config(), io::sink())?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(Arc::clone(&running), listener.path().to_path_buf())?;
    info!(path = %listener.path().display(), "serving device");

    while running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let output = stream
            .try_clone()
            .map_err(|err| transport_error("stream clone failed", err))?;
        debug!(kind = stream.kind(), peer = ?stream.peer_credentials(), "client connected");

        protocol.clear_buffer();
        protocol.set_output(output);
        match protocol.pump(stream) {
            Ok(lines) => info!(lines, "client disconnected"),
            Err(err) => warn!(error = %err, "client session ended"),
        }
        protocol.set_output(io::sink());
    }

    info!("shutting down");
    Ok(SUCCESS)
}

/// Clear `running` and poke the listener so a blocked accept returns.
fn install_ctrlc_handler(running: Arc<AtomicBool>, path: PathBuf) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
        let _ = UnixDomainSocket::connect(&path);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("failed to install signal handler: {err}")))
}
