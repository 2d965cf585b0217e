use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::future::join_all;
use lu_collective::{Collective, Error, Stats, distributed, local};

fn row_for(index: usize, width: usize) -> Vec<f64> {
    (0..width).map(|j| (index * 100 + j) as f64 + 0.5).collect()
}

/// Every rank broadcasts `rows` rows, row `r` rooted at `r % size`, and
/// returns the rows it ended up holding.
async fn exchange_rows<C>(endpoints: Vec<C>, rows: usize, width: usize) -> Vec<Vec<Vec<f64>>>
where
    C: Collective + 'static,
{
    let handles = endpoints.into_iter().map(|mut comm| {
        tokio::spawn(async move {
            let size = comm.size();
            let mut held = Vec::with_capacity(rows);
            for r in 0..rows {
                let root = r % size;
                let mut row = if comm.rank() == root {
                    row_for(r, width)
                } else {
                    vec![0.0; width]
                };
                comm.barrier().await.unwrap();
                comm.broadcast_row(root, &mut row).await.unwrap();
                held.push(row);
            }
            held
        })
    });

    join_all(handles)
        .await
        .into_iter()
        .map(|h| h.unwrap())
        .collect()
}

#[tokio::test]
async fn test_local_broadcast_reaches_every_worker() {
    let held = exchange_rows(local::group(4), 9, 5).await;

    assert_eq!(held.len(), 4);
    for rows in held {
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row, &row_for(r, 5));
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distributed_broadcast_reaches_every_rank() {
    let held = exchange_rows(distributed::world(5), 12, 3).await;

    assert_eq!(held.len(), 5);
    for rows in held {
        for (r, row) in rows.iter().enumerate() {
            assert_eq!(row, &row_for(r, 3));
        }
    }
}

#[tokio::test]
async fn test_single_worker_group_is_a_no_op() {
    for held in [
        exchange_rows(local::group(1), 3, 2).await,
        exchange_rows(distributed::world(1), 3, 2).await,
    ] {
        assert_eq!(held, vec![vec![row_for(0, 2), row_for(1, 2), row_for(2, 2)]]);
    }
}

async fn barrier_releases_all_together<C>(endpoints: Vec<C>)
where
    C: Collective + 'static,
{
    let size = endpoints.len();
    let arrived = Arc::new(AtomicUsize::new(0));

    let handles = endpoints.into_iter().map(|mut comm| {
        let arrived = Arc::clone(&arrived);
        tokio::spawn(async move {
            for round in 1..=3 {
                arrived.fetch_add(1, Ordering::SeqCst);
                comm.barrier().await.unwrap();
                assert!(arrived.load(Ordering::SeqCst) >= round * size);
                comm.barrier().await.unwrap();
            }
        })
    });

    for handle in join_all(handles).await {
        handle.unwrap();
    }
    assert_eq!(arrived.load(Ordering::SeqCst), 3 * size);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_local_barrier_is_reusable() {
    barrier_releases_all_together(local::group(6)).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distributed_barrier_is_reusable() {
    barrier_releases_all_together(distributed::world(6)).await;
}

#[tokio::test]
async fn test_invalid_root_is_rejected() {
    let mut comm = local::group(2).remove(0);
    let mut row = vec![1.0];
    let err = comm.broadcast_row(2, &mut row).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRoot { root: 2, size: 2 }));

    let mut rank = distributed::world(3).remove(1);
    let err = rank.broadcast_row(7, &mut row).await.unwrap_err();
    assert!(matches!(err, Error::InvalidRoot { root: 7, size: 3 }));
}

#[tokio::test]
async fn test_length_mismatch_is_reported() {
    let mut world = distributed::world(2);
    let mut peer = world.pop().unwrap();
    let mut root = world.pop().unwrap();

    let mut long = vec![1.0, 2.0, 3.0];
    root.broadcast_row(0, &mut long).await.unwrap();

    let mut short = vec![0.0; 2];
    let err = peer.broadcast_row(0, &mut short).await.unwrap_err();
    assert!(matches!(err, Error::LengthMismatch { expected: 2, got: 3 }));
}

#[tokio::test]
async fn test_departed_peer_is_reported_as_disconnected() {
    let mut world = distributed::world(2);
    drop(world.pop());
    let mut coordinator = world.pop().unwrap();

    let err = coordinator.barrier().await.unwrap_err();
    assert!(matches!(err, Error::Disconnected(1)));
}

#[tokio::test]
async fn test_barrier_tolerates_out_of_order_arrivals() {
    let mut world = distributed::world(3);
    let mut last = world.pop().unwrap();
    let mut middle = world.pop().unwrap();
    let mut coordinator = world.pop().unwrap();

    // Rank 2 arrives first, so the coordinator parks its message while it
    // waits for rank 1.
    let late = tokio::spawn(async move {
        last.barrier().await.unwrap();
        last
    });
    tokio::task::yield_now().await;
    let early = tokio::spawn(async move {
        middle.barrier().await.unwrap();
        middle
    });

    coordinator.barrier().await.unwrap();
    let last = late.await.unwrap();
    let middle = early.await.unwrap();

    assert_eq!(coordinator.pending(), 0);
    assert_eq!(middle.pending(), 0);
    assert_eq!(last.pending(), 0);
}

#[tokio::test]
async fn test_local_inboxes_drain_after_exchange() {
    let mut group = local::group(2);
    let mut receiver = group.pop().unwrap();
    let mut root = group.pop().unwrap();

    let mut row = vec![4.0, 5.0];
    root.broadcast_row(0, &mut row).await.unwrap();
    assert!(!receiver.inbox_is_empty().unwrap());

    let mut got = vec![0.0; 2];
    receiver.broadcast_row(0, &mut got).await.unwrap();
    assert_eq!(got, row);
    assert!(receiver.inbox_is_empty().unwrap());
}

async fn stats_count_completed_calls<C>(endpoints: Vec<C>)
where
    C: Collective + 'static,
{
    let handles = endpoints.into_iter().map(|mut comm| {
        tokio::spawn(async move {
            let mut row = vec![comm.rank() as f64; 2];
            comm.barrier().await.unwrap();
            comm.broadcast_row(0, &mut row).await.unwrap();
            comm.broadcast_row(1, &mut row).await.unwrap();
            comm.barrier().await.unwrap();

            // A rejected call is not counted.
            let size = comm.size();
            assert!(comm.broadcast_row(size, &mut row).await.is_err());
            comm.stats()
        })
    });

    for handle in join_all(handles).await {
        assert_eq!(
            handle.unwrap(),
            Stats {
                barriers: 2,
                broadcasts: 2,
            }
        );
    }
}

#[tokio::test]
async fn test_local_stats_count_completed_calls() {
    stats_count_completed_calls(local::group(3)).await;
}

#[tokio::test]
async fn test_distributed_stats_count_completed_calls() {
    stats_count_completed_calls(distributed::world(3)).await;
}

#[tokio::test]
async fn test_fresh_endpoint_has_no_stats() {
    assert_eq!(local::group(2)[0].stats(), Stats::default());
    assert_eq!(distributed::world(2)[1].stats(), Stats::default());
}
