use comms::msg::{Command, Msg, Payload};
use tokio::io;

#[tokio::test]
async fn send_recv_counts() {
    const SIZE: usize = 256;

    let (one, two) = io::duplex(SIZE);
    let (rx, tx) = io::split(one);
    let (_, mut tx) = comms::channel(rx, tx);

    let counts = [2, 0, 1, 0, 5, 7];
    tx.send(&Msg::Data(Payload::Counts(&counts))).await.unwrap();

    let (rx, tx) = io::split(two);
    let (mut rx, _) = comms::channel(rx, tx);

    let mut buf = Vec::new();
    let msg: Msg = rx.recv_into(&mut buf).await.unwrap();

    assert_eq!(msg, Msg::Data(Payload::Counts(&counts)));
}

#[tokio::test]
async fn frames_arrive_in_order() {
    const SIZE: usize = 256;

    let (one, two) = io::duplex(SIZE);
    let (rx, tx) = io::split(one);
    let (_, mut tx) = comms::channel(rx, tx);

    let (rx, tx2) = io::split(two);
    let (mut rx, _) = comms::channel(rx, tx2);

    let sender = tokio::spawn(async move {
        let likelihood = Msg::Control(Command::Likelihood {
            round: 0,
            before: -42.0,
            after: -41.5,
        });
        tx.send(&likelihood).await?;
        tx.send(&Msg::Err("boom".into())).await?;
        tx.send(&Msg::Control(Command::Disconnect)).await
    });

    let mut buf = Vec::new();

    let msg: Msg = rx.recv_into(&mut buf).await.unwrap();
    assert_eq!(msg.kind(), "control/likelihood");

    let msg: Msg = rx.recv_into(&mut buf).await.unwrap();
    assert_eq!(msg, Msg::Err("boom".into()));

    let msg: Msg = rx.recv_into(&mut buf).await.unwrap();
    assert_eq!(msg, Msg::Control(Command::Disconnect));

    sender.await.unwrap().unwrap();
}
