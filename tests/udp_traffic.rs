use dis_engine::domain::codec;
use dis_engine::domain::geodetic::Wgs84;
use dis_engine::domain::ports::Transport;
use dis_engine::domain::tuning::events::EventTuning;
use dis_engine::domain::tuning::spawn::SpawnTuning;
use dis_engine::domain::{AbsoluteTimestamp, PduKind};
use dis_engine::interface_adapters::net::UdpTransport;
use dis_engine::interface_adapters::state::SystemClock;
use dis_engine::use_cases::{
    ListenSummary, LoopSettings, PduCounters, Simulation, SimulationSettings, run_listener,
    run_simulation,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

fn loopback() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

fn settings(entity_count: usize) -> SimulationSettings {
    SimulationSettings {
        protocol_version: 7,
        exercise_id: 1,
        site_id: 18,
        application_id: 23,
        entity_count,
        target_rate: 5.0,
        tick_interval: Duration::from_millis(20),
        duration: Some(Duration::from_millis(300)),
        rng_seed: Some(7),
    }
}

#[tokio::test]
async fn when_simulator_sends_over_loopback_then_every_datagram_decodes() {
    let receiver = UdpTransport::bind_listener(loopback())
        .await
        .expect("receiver binds");
    let sender = UdpTransport::bind_sender(receiver.local_addr().expect("receiver address"))
        .await
        .expect("sender binds");

    let settings = settings(3);
    let mut sim = Simulation::from_settings(
        &settings,
        &SpawnTuning::default(),
        EventTuning::default(),
        &Wgs84,
    );
    let summary = run_simulation(
        &mut sim,
        &sender,
        &SystemClock,
        &PduCounters::default(),
        LoopSettings {
            tick_interval: settings.tick_interval,
            duration: settings.duration,
        },
        Arc::new(Notify::new()),
    )
    .await
    .expect("system clock is after the epoch");

    assert!(summary.sent(PduKind::EntityState) >= 3);

    let mut buf = vec![0u8; 8192];
    let mut entity_states = 0u64;
    for _ in 0..summary.pdus_sent {
        let (n, _) = tokio::time::timeout(Duration::from_secs(1), receiver.recv(&mut buf))
            .await
            .expect("datagram arrives")
            .expect("recv succeeds");
        let pdu = codec::decode(&buf[..n]).expect("datagram decodes");
        assert_eq!(pdu.header.exercise_id, 1);
        assert_eq!(usize::from(pdu.header.length), n);
        if pdu.kind() == PduKind::EntityState {
            entity_states += 1;
        }
    }
    assert_eq!(entity_states, summary.sent(PduKind::EntityState));
}

#[tokio::test]
async fn when_listener_receives_mixed_traffic_then_each_kind_is_counted() {
    let listener = UdpTransport::bind_listener(loopback())
        .await
        .expect("listener binds");
    let peer = UdpTransport::bind_sender(listener.local_addr().expect("listener address"))
        .await
        .expect("peer binds");

    let mut sim = Simulation::from_settings(
        &settings(2),
        &SpawnTuning::default(),
        EventTuning::silent(),
        &Wgs84,
    );
    let pdus = sim.tick(0.2, AbsoluteTimestamp::from_epoch_seconds(1_700_000_000));
    assert_eq!(pdus.len(), 2);

    let mut unknown = vec![7, 1, 255, 0];
    unknown.extend_from_slice(&0x8000_0001u32.to_be_bytes());
    unknown.extend_from_slice(&12u16.to_be_bytes());
    unknown.extend_from_slice(&[0, 0]);

    let counters = Arc::new(PduCounters::default());
    let shutdown = Arc::new(Notify::new());
    let task = {
        let counters = counters.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { run_listener(&listener, &counters, None, shutdown).await })
    };

    for pdu in &pdus {
        peer.send(&codec::encode(pdu)).await.expect("send");
    }
    peer.send(&[7, 1, 1]).await.expect("send");
    peer.send(&unknown).await.expect("send");

    for _ in 0..100 {
        let snapshot = counters.snapshot();
        if snapshot.total_received() + snapshot.malformed + snapshot.unsupported.len() as u64
            >= 4
        {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    shutdown.notify_one();
    let summary = task.await.expect("listener task");

    assert_eq!(
        summary,
        ListenSummary {
            datagrams: 4,
            decoded: 2,
            malformed: 1,
            unsupported: 1,
            sink_failures: 0,
        }
    );
    assert_eq!(counters.snapshot().received_of(PduKind::EntityState), 2);
}
