use std::io::{ErrorKind, Read, Write};
use std::thread::JoinHandle;
use std::time::Duration;

use serialport::{SerialPort, SerialPortType};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

use crate::config::{SerialSettings, UsbFilter};
use crate::error::AppError;
use crate::serial::{SortCommand, SorterLink};

const READ_TIMEOUT: Duration = Duration::from_millis(100);
const READ_CHUNK: usize = 64;
const COMMAND_BUFFER: usize = 16;

/// USB CDC serial connection to the sorter.
///
/// Opening asserts DTR, which is the line-state handshake the sorter firmware
/// waits for before it starts listening. Closing clears it again. Bytes are
/// queued to a writer thread so a stalled port never holds up the caller.
/// Either I/O thread cancels the shared token when the device goes away.
pub struct SerialSorterLink {
    port_name: String,
    control: Option<Box<dyn SerialPort>>,
    open: bool,
    command_tx: Option<mpsc::Sender<SortCommand>>,
    cancel_token: CancellationToken,
    threads: Vec<JoinHandle<()>>,
}

impl SerialSorterLink {
    pub fn connect(settings: &SerialSettings) -> Result<Self, AppError> {
        let port_name = match &settings.port {
            Some(port) => port.clone(),
            None => find_port(&settings.filters)?,
        };
        tracing::info!(
            "Serial: opening {} at {} baud",
            port_name,
            settings.baud_rate
        );

        let mut port = serialport::new(&port_name, settings.baud_rate)
            .timeout(READ_TIMEOUT)
            .open()?;
        port.write_data_terminal_ready(true)?;

        let reader = port.try_clone()?;
        let writer = port.try_clone()?;
        let link = Self::from_parts(port_name, reader, writer, Some(port))?;
        tracing::info!("Serial: connected to {}", link.port_name);
        Ok(link)
    }

    /// Start the reader and writer threads over already-open halves.
    /// `control` receives the DTR clear on close.
    pub fn from_parts<R, W>(
        port_name: String,
        reader: R,
        writer: W,
        control: Option<Box<dyn SerialPort>>,
    ) -> Result<Self, AppError>
    where
        R: Read + Send + 'static,
        W: Write + Send + 'static,
    {
        let cancel_token = CancellationToken::new();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);

        let reader_token = cancel_token.clone();
        let reader_name = port_name.clone();
        let reader_thread = std::thread::Builder::new()
            .name("serial-reader".to_string())
            .spawn(move || read_loop(reader, reader_token, reader_name))?;

        let writer_token = cancel_token.clone();
        let writer_name = port_name.clone();
        let writer_thread = std::thread::Builder::new()
            .name("serial-writer".to_string())
            .spawn(move || write_loop(writer, command_rx, writer_token, writer_name))?;

        Ok(Self {
            port_name,
            control,
            open: true,
            command_tx: Some(command_tx),
            cancel_token,
            threads: vec![reader_thread, writer_thread],
        })
    }
}

impl SorterLink for SerialSorterLink {
    fn name(&self) -> &str {
        &self.port_name
    }

    fn is_open(&self) -> bool {
        self.open && !self.cancel_token.is_cancelled()
    }

    fn send(&mut self, command: SortCommand) -> Result<(), AppError> {
        if !self.is_open() {
            return Err(AppError::LinkClosed);
        }
        let Some(command_tx) = &self.command_tx else {
            return Err(AppError::LinkClosed);
        };
        tracing::debug!("Serial: queueing {:?} for {}", command, self.port_name);
        command_tx.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => AppError::LinkBusy,
            TrySendError::Closed(_) => AppError::LinkClosed,
        })
    }

    fn close(&mut self) -> Result<(), AppError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.cancel_token.cancel();
        // Dropping the sender wakes the writer.
        self.command_tx = None;
        for thread in self.threads.drain(..) {
            if thread.join().is_err() {
                tracing::error!("Serial: I/O thread for {} panicked", self.port_name);
            }
        }
        if let Some(control) = self.control.as_mut() {
            control.write_data_terminal_ready(false)?;
        }
        tracing::info!("Serial: disconnected from {}", self.port_name);
        Ok(())
    }
}

impl Drop for SerialSorterLink {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::warn!("Serial: failed to close {}: {}", self.port_name, e);
        }
    }
}

/// Name of the first USB serial port whose ids appear in `filters`.
pub fn find_port(filters: &[UsbFilter]) -> Result<String, AppError> {
    let ports = serialport::available_ports()?;
    tracing::debug!("Serial: {} ports available", ports.len());
    ports
        .into_iter()
        .find(|info| match &info.port_type {
            SerialPortType::UsbPort(usb) => matches_filter(usb.vid, usb.pid, filters),
            _ => false,
        })
        .map(|info| info.port_name)
        .ok_or(AppError::NoMatchingPort)
}

pub fn matches_filter(vendor_id: u16, product_id: u16, filters: &[UsbFilter]) -> bool {
    filters
        .iter()
        .any(|f| f.vendor_id == vendor_id && f.product_id == product_id)
}

// The sorter prints debug lines; surface them in our log.
fn read_loop<R: Read>(mut reader: R, cancel_token: CancellationToken, port_name: String) {
    let mut buffer = [0u8; READ_CHUNK];
    while !cancel_token.is_cancelled() {
        match reader.read(&mut buffer) {
            Ok(0) => {}
            Ok(n) => {
                let text = String::from_utf8_lossy(&buffer[..n]);
                tracing::info!("Sorter {}: {}", port_name, text.trim_end());
            }
            Err(e) if e.kind() == ErrorKind::TimedOut => {}
            Err(e) => {
                tracing::error!("Serial: read from {} failed: {}", port_name, e);
                cancel_token.cancel();
                break;
            }
        }
    }
    tracing::debug!("Serial: reader for {} stopped", port_name);
}

fn write_loop<W: Write>(
    mut writer: W,
    mut command_rx: mpsc::Receiver<SortCommand>,
    cancel_token: CancellationToken,
    port_name: String,
) {
    while let Some(command) = command_rx.blocking_recv() {
        if cancel_token.is_cancelled() {
            break;
        }
        let written = writer
            .write_all(&[command.byte()])
            .and_then(|_| writer.flush());
        if let Err(e) = written {
            tracing::error!("Serial: write to {} failed: {}", port_name, e);
            cancel_token.cancel();
            break;
        }
    }
    tracing::debug!("Serial: writer for {} stopped", port_name);
}
