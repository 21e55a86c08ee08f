//! A single node on the host: a process broadcasts a beacon every second
//! through the null duty cycling layer. The loopback radio hears each beacon
//! right back, and the radio input process hands it up to the MAC layer.
//!
//! Run with `RUST_LOG=debug` to see the kernel at work.

use core::cell::RefCell;
use std::{process::ExitCode, thread, time::Duration};

use log::{error, info};
use mote::{
    driver::{
        frame::{LinkAddr, PacketAddr, PacketAttr, Packetbuf, LINKADDR_SIZE},
        watchdog::NoWatchdog,
    },
    net::{
        rdc::{NullRdc, NullRdcConfig, RadioInputProcess, Rdc},
        Mac,
    },
    sys::{
        ClockDuration, Context, Data, EtimerId, Event, Kernel, Lc, Process, PtState, Signals,
        TickClock,
    },
};
use static_cell::StaticCell;

mod framer;
mod loopback;

use framer::Ieee802154Framer;
use loopback::{HostRtimer, LoopbackRadio};

type DemoRdc = NullRdc<LoopbackRadio, Ieee802154Framer, HostRtimer, NoWatchdog, LoggingMac>;

const BEACONS: u8 = 5;
const BEACON_INTERVAL: ClockDuration = ClockDuration::secs(1);

static CLOCK: TickClock = TickClock::new();
static SIGNALS: Signals = Signals::new();
static RDC: StaticCell<RefCell<DemoRdc>> = StaticCell::new();

struct LoggingMac;

impl Mac for LoggingMac {
    fn input(&mut self, packetbuf: &Packetbuf) {
        info!(
            "received {:?} from {:x?} (seqno {})",
            core::str::from_utf8(packetbuf.data()).unwrap_or("<binary>"),
            packetbuf.addr(PacketAddr::Sender).as_bytes(),
            packetbuf.attr(PacketAttr::MacSeqno)
        );
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum BeaconPos {
    #[default]
    Start,
    Waiting,
}

struct Beacon<'r> {
    lc: Lc<BeaconPos>,
    timer: EtimerId,
    rdc: &'r RefCell<DemoRdc>,
    packetbuf: Packetbuf,
    seqno: u8,
}

impl<'r> Beacon<'r> {
    fn new(rdc: &'r RefCell<DemoRdc>, timer: EtimerId) -> Self {
        Self {
            lc: Lc::new(),
            timer,
            rdc,
            packetbuf: Packetbuf::new(),
            seqno: 0,
        }
    }

    fn send(&mut self) {
        let Ok(mut rdc) = self.rdc.try_borrow_mut() else {
            error!("beacon: radio busy, skipping beacon {}", self.seqno);
            return;
        };
        self.packetbuf.clear();
        self.packetbuf
            .copy_from(format!("beacon {}", self.seqno).as_bytes());
        self.packetbuf.set_addr(PacketAddr::Receiver, LinkAddr::NULL);
        self.packetbuf
            .set_attr(PacketAttr::MacSeqno, self.seqno as u16);

        let seqno = self.seqno;
        rdc.send(&mut self.packetbuf, |status, transmissions| {
            info!("beacon {seqno}: {status:?} after {transmissions} transmission(s)")
        });
        self.seqno = self.seqno.wrapping_add(1);
    }
}

impl Process for Beacon<'_> {
    fn name(&self) -> &'static str {
        "Beacon"
    }

    fn reset(&mut self) {
        self.lc.rewind();
        self.seqno = 0;
    }

    fn thread(&mut self, ctx: &mut Context<'_, '_>, ev: Event, data: Data) -> PtState {
        match self.lc.get() {
            BeaconPos::Start => {
                if let Err(err) = ctx.etimer_set(self.timer, BEACON_INTERVAL.ticks()) {
                    error!("beacon: cannot arm timer: {err:?}");
                    return self.lc.exit();
                }
                self.lc.wait(BeaconPos::Waiting)
            }
            BeaconPos::Waiting => {
                if ev != Event::TIMER || data != Data::Etimer(self.timer) {
                    return PtState::Waiting;
                }
                self.send();
                if self.seqno == BEACONS {
                    return self.lc.end();
                }
                if let Err(err) = ctx.etimer_reset(self.timer) {
                    error!("beacon: cannot rearm timer: {err:?}");
                    return self.lc.exit();
                }
                PtState::Waiting
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let mut node_addr = [0; LINKADDR_SIZE];
    node_addr[LINKADDR_SIZE - 1] = 1;

    let rdc: &RefCell<DemoRdc> = RDC.init(RefCell::new(NullRdc::new(
        LoopbackRadio::new(&SIGNALS),
        Ieee802154Framer,
        HostRtimer::new(),
        NoWatchdog,
        LoggingMac,
        NullRdcConfig::new(LinkAddr::new(node_addr)),
    )));
    rdc.borrow_mut().init();

    let mut input = RadioInputProcess::new(rdc);
    let mut kernel = Kernel::new(&CLOCK, &SIGNALS);
    let timer = match kernel.etimer_alloc() {
        Ok(timer) => timer,
        Err(err) => {
            error!("no event timer: {err:?}");
            return ExitCode::FAILURE;
        }
    };
    let mut beacon = Beacon::new(rdc, timer);

    let (input_id, beacon_id) = match (kernel.register(&mut input), kernel.register(&mut beacon)) {
        (Ok(input_id), Ok(beacon_id)) => (input_id, beacon_id),
        _ => {
            error!("process table full");
            return ExitCode::FAILURE;
        }
    };
    rdc.borrow_mut().radio_mut().set_rx_process(input_id);
    kernel.start(input_id, Data::None);
    kernel.start(beacon_id, Data::None);

    let tick = Duration::from_micros(ClockDuration::from_ticks(1).to_micros() as u64);
    while kernel.is_running(beacon_id) {
        while kernel.run() > 0 {}
        thread::sleep(tick);
        SIGNALS.on_clock_tick(CLOCK.tick());
    }
    // Deliver the last beacon.
    while kernel.run() > 0 {}

    info!("sent {BEACONS} beacons in {} ticks", kernel.now());
    ExitCode::SUCCESS
}
