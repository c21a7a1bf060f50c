use std::{num::NonZeroUsize, time::Duration};

use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload},
    specs::{HyperSpec, SamplerSpec},
};
use tokio::{
    io::{self, DuplexStream, ReadHalf, WriteHalf},
    time::timeout,
};
use topic_model::corpus::{PartitionData, StopWords, Tokenizer};
use worker::{PartitionOutcome, WorkerBuilder, WorkerErr};

type Rx = OnoReceiver<ReadHalf<DuplexStream>>;
type Tx = OnoSender<WriteHalf<DuplexStream>>;

const DOCS: [&str; 5] = [
    "the cat sat",
    "the dog sat",
    "the cat ran",
    "a dog ran",
    "a cat sat",
];

fn channel_pair() -> ((Rx, Tx), (Rx, Tx)) {
    let (stream1, stream2) = io::duplex(4096);
    let (rx1, tx1) = io::split(stream1);
    let (rx2, tx2) = io::split(stream2);
    (comms::channel(rx1, tx1), comms::channel(rx2, tx2))
}

fn spec(rounds: usize) -> (SamplerSpec, PartitionData) {
    let corpus = Tokenizer::new(StopWords::from_text("the a"), 1).tokenize(&DOCS);

    let spec = SamplerSpec {
        partition: 0,
        topics: NonZeroUsize::new(2).unwrap(),
        vocab_size: corpus.vocabulary.len(),
        rounds: NonZeroUsize::new(rounds).unwrap(),
        hyper: HyperSpec {
            alpha: 0.1,
            beta: 0.1,
        },
        verify_counts: true,
        seed: Some(7),
    };

    let data = PartitionData {
        id: 0,
        docs: (0..corpus.num_docs()).collect(),
        words: corpus.words,
        doc_labels: corpus.doc_labels,
    };

    (spec, data)
}

/// A single partition server: the reconciled table is the local one.
async fn echo_server(mut rx: Rx, mut tx: Tx, rounds: usize) -> io::Result<Vec<Vec<u32>>> {
    let mut buf = Vec::new();
    let mut seen = Vec::new();

    for round in 0..=rounds {
        if round > 0 {
            let msg = rx.recv_into::<Msg>(&mut buf).await?;
            let expected = round - 1;
            assert!(matches!(
                msg,
                Msg::Control(Command::Likelihood { round: r, .. }) if r == expected
            ));
        }

        let Msg::Data(Payload::Counts(local)) = rx.recv_into(&mut buf).await? else {
            panic!("expected the local table");
        };
        let local = local.to_vec();
        tx.send(&Msg::Data(Payload::Counts(&local))).await?;
        seen.push(local);
    }

    let msg = rx.recv_into::<Msg>(&mut buf).await?;
    assert_eq!(msg, Msg::Control(Command::Disconnect));
    Ok(seen)
}

#[tokio::test]
async fn worker_runs_every_round() {
    let _ = env_logger::builder().is_test(true).try_init();

    let ((wk_rx, wk_tx), (sv_rx, sv_tx)) = channel_pair();
    let (spec, data) = spec(3);
    let worker = WorkerBuilder::build(spec, data).unwrap();

    let (outcome, seen) = tokio::join!(worker.run(wk_rx, wk_tx), echo_server(sv_rx, sv_tx, 3));
    let outcome: PartitionOutcome = outcome.unwrap();
    let seen = seen.unwrap();

    assert_eq!(seen.len(), 4);
    let occurrences = Tokenizer::new(StopWords::from_text("the a"), 1)
        .tokenize(&DOCS)
        .occurrences;
    for table in &seen {
        let totals: Vec<usize> = table
            .chunks(2)
            .map(|row| row.iter().sum::<u32>() as usize)
            .collect();
        assert_eq!(totals, occurrences);
    }

    assert_eq!(outcome.log_likelihood.len(), 3);
    assert!(outcome.log_likelihood.iter().all(|(b, a)| b.is_finite() && a.is_finite()));
    assert_eq!(outcome.docs, [0, 1, 2, 3, 4]);
    assert_eq!(outcome.theta.dim(), (5, 2));
    assert_eq!(outcome.metrics.rounds, 3);
}

#[tokio::test]
async fn same_seed_same_tables() {
    let run = || async {
        let ((wk_rx, wk_tx), (sv_rx, sv_tx)) = channel_pair();
        let (spec, data) = spec(2);
        let worker = WorkerBuilder::build(spec, data).unwrap();
        let (outcome, seen) = tokio::join!(worker.run(wk_rx, wk_tx), echo_server(sv_rx, sv_tx, 2));
        outcome.unwrap();
        seen.unwrap()
    };

    assert_eq!(run().await, run().await);
}

#[tokio::test]
async fn worker_stops_when_the_server_aborts() {
    let ((wk_rx, wk_tx), (mut sv_rx, mut sv_tx)) = channel_pair();
    let (spec, data) = spec(2);
    let worker = WorkerBuilder::build(spec, data).unwrap();

    let server = async move {
        let mut buf = Vec::new();
        let _ = sv_rx.recv_into::<Msg>(&mut buf).await?;
        sv_tx.send(&Msg::Err("negative count".into())).await?;
        io::Result::Ok(())
    };

    let (res, server) = tokio::join!(worker.run(wk_rx, wk_tx), server);
    server.unwrap();
    assert!(matches!(
        res,
        Err(WorkerErr::Aborted { round: 0, ref reason }) if reason == "negative count"
    ));
}

#[tokio::test]
async fn worker_rejects_wrong_table_length() {
    let ((wk_rx, wk_tx), (mut sv_rx, mut sv_tx)) = channel_pair();
    let (spec, data) = spec(1);
    let worker = WorkerBuilder::build(spec, data).unwrap();
    let task = tokio::spawn(worker.run(wk_rx, wk_tx));

    let mut buf = Vec::new();
    let _ = sv_rx.recv_into::<Msg>(&mut buf).await.unwrap();
    sv_tx.send(&Msg::Data(Payload::Counts(&[1, 2, 3]))).await.unwrap();

    let res = task.await.unwrap();
    assert!(matches!(
        res,
        Err(WorkerErr::CountsLengthMismatch { got: 3, expected: 8, .. })
    ));

    // nothing else goes out after a protocol violation
    let next = timeout(Duration::from_millis(50), sv_rx.recv_into::<Msg>(&mut buf)).await;
    assert!(!matches!(next, Ok(Ok(Msg::Data(_)))));
}

#[tokio::test]
async fn verification_catches_a_lying_server() {
    let ((wk_rx, wk_tx), (mut sv_rx, mut sv_tx)) = channel_pair();
    let (spec, data) = spec(1);
    let worker = WorkerBuilder::build(spec, data).unwrap();
    let task = tokio::spawn(worker.run(wk_rx, wk_tx));

    let mut buf = Vec::new();
    let _ = sv_rx.recv_into::<Msg>(&mut buf).await.unwrap();
    sv_tx.send(&Msg::Data(Payload::Counts(&[0; 8]))).await.unwrap();

    let res = task.await.unwrap();
    assert!(matches!(res, Err(WorkerErr::Model(_))));

    let reply = sv_rx.recv_into::<Msg>(&mut buf).await.unwrap();
    assert!(matches!(reply, Msg::Err(_)));
}

#[test]
fn builder_rejects_foreign_word_ids() {
    let (mut spec, data) = spec(1);
    spec.vocab_size = 2;

    assert!(matches!(
        WorkerBuilder::build(spec, data),
        Err(WorkerErr::Model(_))
    ));
}
