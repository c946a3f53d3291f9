// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

#![deny(clippy::all, clippy::pedantic)]
#![deny(rustdoc::all)]
#![allow(rustdoc::missing_crate_level_docs)]

use args::{CmdArgs, Parser};
use config::{SmfParams, SmfParamsBuilderError};
use mgmt::{MgmtHandle, MgmtParams, start_mgmt};
use std::sync::mpsc::RecvTimeoutError;
use std::time::Duration;
use tracectl::init_logging;
use tracing::{error, info};

/// How often the main thread checks that management is still running
const MGMT_CHECK_INTERVAL: Duration = Duration::from_millis(500);

fn mgmt_params(args: &CmdArgs) -> Result<MgmtParams, SmfParamsBuilderError> {
    let smf_params = SmfParams::new(args.name(), args.model())?;
    info!("{smf_params}");
    let mut params = MgmtParams::new(
        args.relations_dir().to_path_buf(),
        args.workload_root().to_path_buf(),
        smf_params,
    );
    if args.patch_service() {
        params.service_patch = Some(args.namespace().to_string());
    }
    Ok(params)
}

/// Run until SIGINT or until management ends on its own. Returns the exit code.
fn supervise(mgmt: MgmtHandle, stop_rx: &std::sync::mpsc::Receiver<()>) -> i32 {
    loop {
        match stop_rx.recv_timeout(MGMT_CHECK_INTERVAL) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                info!("Shutting down SMF operator");
                return match mgmt.stop() {
                    Ok(()) => 0,
                    Err(e) => {
                        error!("Management failed: {e}");
                        1
                    }
                };
            }
            Err(RecvTimeoutError::Timeout) if mgmt.is_finished() => {
                match mgmt.wait() {
                    Ok(()) => error!("Management thread exited"),
                    Err(e) => error!("Management failed: {e}"),
                }
                return 1;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }
    }
}

fn main() {
    let args = CmdArgs::parse();
    if let Err(e) = init_logging(args.log_level(), args.tracing()) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }
    info!(
        " ━━━━━━ SMF operator for '{}' in model '{}' started ━━━━━━",
        args.name(),
        args.model()
    );

    let (stop_tx, stop_rx) = std::sync::mpsc::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    }) {
        error!("Failed to set SIGINT handler: {e}");
        std::process::exit(1);
    }

    let params = match mgmt_params(&args) {
        Ok(params) => params,
        Err(e) => {
            error!("Invalid SMF parameters: {e}");
            std::process::exit(1);
        }
    };

    /* start management */
    let mgmt = match start_mgmt(params) {
        Ok(mgmt) => mgmt,
        Err(e) => {
            error!("Failed to start management: {e}");
            std::process::exit(1);
        }
    };

    let exit_code = supervise(mgmt, &stop_rx);
    std::process::exit(exit_code);
}
