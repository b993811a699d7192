//! Drives the full engine — client, ingress, digester, retry — against a
//! scripted modem on the other end of a pair of byte pipes.

use core::sync::atomic::{AtomicU32, Ordering};

use at_chat::{
    call::Calls,
    error::CmeError,
    rf::{RfFunctionality, RfLevel},
    Chat, ChatBuffers, Config, DefaultDigester, Error, FinalCode, PduMatcher, Retry, Urc,
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::pipe::Pipe;
use embassy_time::Duration;

const BUF: usize = 256;

type SerialPipe = Pipe<CriticalSectionRawMutex, 256>;

struct PipeWriter<'a> {
    pipe: &'a SerialPipe,
}

impl embedded_io_async::ErrorType for PipeWriter<'_> {
    type Error = core::convert::Infallible;
}

impl embedded_io_async::Write for PipeWriter<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(self.pipe.write(buf).await)
    }
}

struct PipeReader<'a> {
    pipe: &'a SerialPipe,
}

impl embedded_io_async::ErrorType for PipeReader<'_> {
    type Error = core::convert::Infallible;
}

impl embedded_io_async::Read for PipeReader<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.pipe.read(buf).await)
    }
}

async fn read_command(pipe: &SerialPipe) -> String {
    let mut line = String::new();
    loop {
        let mut byte = [0u8; 1];
        pipe.read(&mut byte).await;
        if byte[0] == b'\r' {
            return line;
        }
        line.push(byte[0] as char);
    }
}

async fn send(pipe: &SerialPipe, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        let written = pipe.write(bytes).await;
        bytes = &bytes[written..];
    }
}

async fn send_echo(pipe: &SerialPipe, command: &str) {
    send(pipe, command.as_bytes()).await;
    send(pipe, b"\r\r\n").await;
}

fn fast_config() -> Config {
    Config::new()
        .response_timeout(Duration::from_millis(500))
        .cmd_cooldown(Duration::from_millis(1))
}

#[tokio::test]
async fn command_round_trip_with_interleaved_urc() {
    static BUFFERS: ChatBuffers<Urc, BUF, 4, 2> = ChatBuffers::new();
    static TO_MODEM: SerialPipe = SerialPipe::new();
    static FROM_MODEM: SerialPipe = SerialPipe::new();

    let (mut ingress, mut client) = BUFFERS.split(
        PipeWriter { pipe: &TO_MODEM },
        DefaultDigester::<BUF>::new(),
        PduMatcher::default(),
        fast_config(),
    );
    let mut reader = PipeReader { pipe: &FROM_MODEM };
    let mut urcs = BUFFERS.urc_subscription().unwrap();

    let modem = async {
        // An unsolicited ring before any command.
        send(&FROM_MODEM, b"RING\r\n").await;

        let command = read_command(&TO_MODEM).await;
        assert_eq!(command, "AT+CGMI");
        send_echo(&FROM_MODEM, &command).await;
        send(&FROM_MODEM, b"Quectel\r\n\r\nOK\r\n").await;

        core::future::pending::<()>().await;
    };

    let test = async {
        let result = client.chat("AT+CGMI").await.unwrap();
        assert_eq!(result.text(), "Quectel");
        assert_eq!(urcs.next_message_pure().await, Urc::Ring(None));
    };

    tokio::select! {
        () = test => {}
        () = modem => unreachable!(),
        _ = ingress.read_from(&mut reader) => unreachable!(),
    }
}

#[tokio::test]
async fn rejected_command_succeeds_on_third_attempt() {
    static BUFFERS: ChatBuffers<Urc, BUF, 4, 2> = ChatBuffers::new();
    static TO_MODEM: SerialPipe = SerialPipe::new();
    static FROM_MODEM: SerialPipe = SerialPipe::new();

    let (mut ingress, mut client) = BUFFERS.split(
        PipeWriter { pipe: &TO_MODEM },
        DefaultDigester::<BUF>::new(),
        PduMatcher::default(),
        fast_config(),
    );
    let mut reader = PipeReader { pipe: &FROM_MODEM };

    let sends = AtomicU32::new(0);

    let modem = async {
        loop {
            let command = read_command(&TO_MODEM).await;
            assert_eq!(command, "AT+CFUN=1");
            let attempt = sends.fetch_add(1, Ordering::Relaxed) + 1;
            send_echo(&FROM_MODEM, &command).await;
            if attempt < 3 {
                send(&FROM_MODEM, b"ERROR\r\n").await;
            } else {
                send(&FROM_MODEM, b"OK\r\n").await;
            }
        }
    };

    let test = async {
        let retry = Retry::new(3).delay(Duration::from_millis(5));
        let result = retry.run(&mut client, "AT+CFUN=1").await;
        assert!(result.is_ok());
    };

    tokio::select! {
        () = test => {}
        () = modem => unreachable!(),
        _ = ingress.read_from(&mut reader) => unreachable!(),
    }

    assert_eq!(sends.load(Ordering::Relaxed), 3);
}

#[tokio::test]
async fn rejected_command_exhausts_retry_budget() {
    static BUFFERS: ChatBuffers<Urc, BUF, 4, 2> = ChatBuffers::new();
    static TO_MODEM: SerialPipe = SerialPipe::new();
    static FROM_MODEM: SerialPipe = SerialPipe::new();

    let (mut ingress, mut client) = BUFFERS.split(
        PipeWriter { pipe: &TO_MODEM },
        DefaultDigester::<BUF>::new(),
        PduMatcher::default(),
        fast_config(),
    );
    let mut reader = PipeReader { pipe: &FROM_MODEM };

    let sends = AtomicU32::new(0);

    let modem = async {
        loop {
            let command = read_command(&TO_MODEM).await;
            assert_eq!(command, "AT+CPBS=\"SM\"");
            sends.fetch_add(1, Ordering::Relaxed);
            send_echo(&FROM_MODEM, &command).await;
            send(&FROM_MODEM, b"ERROR\r\n").await;
        }
    };

    let test = async {
        let retry = Retry::new(2).delay(Duration::from_millis(5));
        let result = retry.run(&mut client, "AT+CPBS=\"SM\"").await;
        assert_eq!(result, Err(Error::Command(FinalCode::Error)));
    };

    tokio::select! {
        () = test => {}
        () = modem => unreachable!(),
        _ = ingress.read_from(&mut reader) => unreachable!(),
    }

    assert_eq!(sends.load(Ordering::Relaxed), 2);
}

#[tokio::test]
async fn rf_controller_against_scripted_modem() {
    static BUFFERS: ChatBuffers<Urc, BUF, 4, 2> = ChatBuffers::new();
    static TO_MODEM: SerialPipe = SerialPipe::new();
    static FROM_MODEM: SerialPipe = SerialPipe::new();

    let (mut ingress, mut client) = BUFFERS.split(
        PipeWriter { pipe: &TO_MODEM },
        DefaultDigester::<BUF>::new(),
        PduMatcher::default(),
        fast_config(),
    );
    let mut reader = PipeReader { pipe: &FROM_MODEM };

    let modem = async {
        let command = read_command(&TO_MODEM).await;
        assert_eq!(command, "AT+CFUN?");
        send_echo(&FROM_MODEM, &command).await;
        send(&FROM_MODEM, b"+CFUN: 4\r\n\r\nOK\r\n").await;

        let command = read_command(&TO_MODEM).await;
        assert_eq!(command, "AT+CFUN=1");
        send_echo(&FROM_MODEM, &command).await;
        send(&FROM_MODEM, b"+CME ERROR: 14\r\n").await;

        let command = read_command(&TO_MODEM).await;
        assert_eq!(command, "AT+CFUN=1");
        send_echo(&FROM_MODEM, &command).await;
        send(&FROM_MODEM, b"OK\r\n").await;

        core::future::pending::<()>().await;
    };

    let test = async {
        let mut rf = RfFunctionality::new(&mut client)
            .with_retry(Retry::new(3).delay(Duration::from_millis(5)));
        assert_eq!(rf.level().await.unwrap(), RfLevel::Airplane);
        rf.set_level(RfLevel::Full).await.unwrap();
    };

    tokio::select! {
        () = test => {}
        () = modem => unreachable!(),
        _ = ingress.read_from(&mut reader) => unreachable!(),
    }
}

#[tokio::test]
async fn failed_dial_reports_progress_code() {
    static BUFFERS: ChatBuffers<Urc, BUF, 4, 2> = ChatBuffers::new();
    static TO_MODEM: SerialPipe = SerialPipe::new();
    static FROM_MODEM: SerialPipe = SerialPipe::new();

    let (mut ingress, mut client) = BUFFERS.split(
        PipeWriter { pipe: &TO_MODEM },
        DefaultDigester::<BUF>::new(),
        PduMatcher::default(),
        fast_config(),
    );
    let mut reader = PipeReader { pipe: &FROM_MODEM };

    let modem = async {
        let command = read_command(&TO_MODEM).await;
        assert_eq!(command, "ATD12345;");
        send_echo(&FROM_MODEM, &command).await;
        send(&FROM_MODEM, b"NO CARRIER\r\n").await;

        core::future::pending::<()>().await;
    };

    let test = async {
        let mut calls = Calls::new(&mut client);
        assert_eq!(
            calls.dial("12345").await,
            Err(Error::Command(FinalCode::NoCarrier))
        );
    };

    tokio::select! {
        () = test => {}
        () = modem => unreachable!(),
        _ = ingress.read_from(&mut reader) => unreachable!(),
    }
}

#[tokio::test]
async fn sim_busy_error_is_typed() {
    static BUFFERS: ChatBuffers<Urc, BUF, 4, 2> = ChatBuffers::new();
    static TO_MODEM: SerialPipe = SerialPipe::new();
    static FROM_MODEM: SerialPipe = SerialPipe::new();

    let (mut ingress, mut client) = BUFFERS.split(
        PipeWriter { pipe: &TO_MODEM },
        DefaultDigester::<BUF>::new(),
        PduMatcher::default(),
        fast_config(),
    );
    let mut reader = PipeReader { pipe: &FROM_MODEM };

    let modem = async {
        let command = read_command(&TO_MODEM).await;
        send_echo(&FROM_MODEM, &command).await;
        send(&FROM_MODEM, b"+CME ERROR: SIM busy\r\n").await;

        core::future::pending::<()>().await;
    };

    let test = async {
        assert_eq!(
            client.chat("AT+CPIN?").await,
            Err(Error::Cme(CmeError::SimBusy))
        );
    };

    tokio::select! {
        () = test => {}
        () = modem => unreachable!(),
        _ = ingress.read_from(&mut reader) => unreachable!(),
    }
}
