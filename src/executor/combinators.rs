//! The stream combinator layer: combine-latest over keyed
//! children, and switch-map for resolver streams that replace their parent
//! value over time.
//!
//! Both combinators are hand-rolled on top of `futures::stream::poll_fn`,
//! the same primitive `juniper_subscriptions::whole_responses_stream` uses
//! to fan a `Value<ValuesResultStream>` tree back into a single response
//! stream. Unlike `juniper_subscriptions`'s hand-rolled poll loop, these
//! combinators never need `Pin::new_unchecked`: every child here is stored
//! as an already-pinned `Pin<Box<dyn Stream>>`/`Pin<Box<dyn Future>>`, and
//! `Pin<Box<T>>` is itself `Unpin`, so a plain `&mut` field can be re-polled
//! safely.

use std::task::Poll;

use futures::future::BoxFuture;
use futures::stream::{BoxStream, StreamExt};

use super::FieldStream;
use crate::value::Value;

/// Combines an ordered set of child field streams into a single stream of
/// `(key, value)` snapshots.
///
/// Emission begins only once every child has produced at least one value.
/// Completes once every child completes.
/// If a child is `Err(())` at the time of emission, the whole combination
/// emits `Err(())` for that tick instead (the error has already been
/// recorded; this call site, not the combinator, decides whether to absorb
/// or keep propagating). A child's `Ok(None)` (field resolved to
/// "undefined") carries through as `None`; the caller building the response
/// object is the one that omits the key.
pub(crate) fn combine_latest<K>(
    children: Vec<(K, FieldStream)>,
) -> BoxStream<'static, Result<Vec<(K, Option<Value>)>, ()>>
where
    K: Clone + Send + 'static,
{
    if children.is_empty() {
        return futures::stream::once(async { Ok(Vec::new()) }).boxed();
    }

    let keys: Vec<K> = children.iter().map(|(k, _)| k.clone()).collect();
    let mut streams: Vec<FieldStream> = children.into_iter().map(|(_, s)| s).collect();
    let mut latest: Vec<Option<Result<Option<Value>, ()>>> = vec![None; streams.len()];
    let mut completed = vec![false; streams.len()];

    futures::stream::poll_fn(move |cx| -> Poll<Option<Result<Vec<(K, Option<Value>)>, ()>>> {
        let mut any_progress = false;
        for i in 0..streams.len() {
            if completed[i] {
                continue;
            }
            match streams[i].as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    latest[i] = Some(item);
                    any_progress = true;
                }
                Poll::Ready(None) => {
                    completed[i] = true;
                    any_progress = true;
                }
                Poll::Pending => {}
            }
        }

        if completed.iter().all(|c| *c) {
            return Poll::Ready(None);
        }

        if latest.iter().all(Option::is_some) {
            if any_progress {
                let has_error = latest.iter().any(|v| matches!(v, Some(Err(()))));
                if has_error {
                    return Poll::Ready(Some(Err(())));
                }
                let snapshot: Vec<(K, Option<Value>)> = keys
                    .iter()
                    .zip(latest.iter())
                    .map(|(k, v)| (k.clone(), v.as_ref().unwrap().clone().unwrap()))
                    .collect();
                return Poll::Ready(Some(Ok(snapshot)));
            }
            return Poll::Pending;
        }

        Poll::Pending
    })
    .boxed()
}

/// Runs an async "build the inner stream from this outer value" step on
/// each emission of `outer`, tearing the previous inner stream down first.
/// Cancellation is idempotent: dropping the previous
/// `Pin<Box<dyn Stream>>`/`Pin<Box<dyn Future>>` unsubscribes it, cascading
/// to whatever it held.
pub(crate) fn switch_map<O, F, Fut>(
    mut outer: BoxStream<'static, O>,
    build_inner: F,
) -> FieldStream
where
    O: Send + 'static,
    F: Fn(O) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = FieldStream> + Send + 'static,
{
    enum State {
        WaitingForOuter,
        Building(BoxFuture<'static, FieldStream>),
        Active(FieldStream),
        Done,
    }

    let mut state = State::WaitingForOuter;
    let mut outer_done = false;
    let build_inner = std::sync::Arc::new(build_inner);

    futures::stream::poll_fn(move |cx| -> Poll<Option<Result<Option<Value>, ()>>> {
        loop {
            // A new outer emission always wins: drop whatever inner work was
            // in flight and start building the replacement.
            if !outer_done {
                match outer.as_mut().poll_next(cx) {
                    Poll::Ready(Some(item)) => {
                        let build_inner = build_inner.clone();
                        state = State::Building(Box::pin(async move { build_inner(item).await }));
                        continue;
                    }
                    Poll::Ready(None) => {
                        outer_done = true;
                    }
                    Poll::Pending => {}
                }
            }

            match &mut state {
                State::WaitingForOuter => {
                    if outer_done {
                        state = State::Done;
                        continue;
                    }
                    return Poll::Pending;
                }
                State::Building(fut) => match fut.as_mut().poll(cx) {
                    Poll::Ready(inner) => {
                        state = State::Active(inner);
                        continue;
                    }
                    Poll::Pending => return Poll::Pending,
                },
                State::Active(inner) => match inner.as_mut().poll_next(cx) {
                    Poll::Ready(Some(item)) => return Poll::Ready(Some(item)),
                    Poll::Ready(None) => {
                        if outer_done {
                            state = State::Done;
                            continue;
                        }
                        return Poll::Pending;
                    }
                    Poll::Pending => return Poll::Pending,
                },
                State::Done => return Poll::Ready(None),
            }
        }
    })
    .boxed()
}
