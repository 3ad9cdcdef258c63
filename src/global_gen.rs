//! Default generator and entry point function.

#![cfg(feature = "global_gen")]
#![cfg_attr(docsrs, doc(cfg(feature = "global_gen")))]

use std::sync;

use crate::Uuid;
use inner::GlobalGenInner;

/// Returns the lock handle of process-wide global generator, creating one if none exists.
fn lock_global_gen() -> sync::MutexGuard<'static, GlobalGenInner> {
    static G: sync::OnceLock<sync::Mutex<GlobalGenInner>> = sync::OnceLock::new();
    G.get_or_init(Default::default)
        .lock()
        .unwrap_or_else(sync::PoisonError::into_inner)
}

/// Generates a UUIDv7 object from the system clock.
///
/// This function employs a global [`MonotonicClockSequence`](crate::MonotonicClockSequence) and
/// guarantees the process-wide monotonic order of UUIDs. On Unix, this function replaces the
/// generator when the process ID changes (i.e., upon process forks) so that parent and child do
/// not continue the same counter.
///
/// # Examples
///
/// ```rust
/// let uuid = mono7::uuid7();
/// println!("{}", uuid); // e.g., "01922bcc-4d2a-7c05-9219-566f82fff672"
/// println!("{:?}", uuid.as_bytes()); // as 16-byte big-endian array
///
/// let uuid_string: String = mono7::uuid7().to_string();
/// ```
pub fn uuid7() -> Uuid {
    lock_global_gen().get().generate()
}

mod inner {
    use std::fmt;

    use rand::rngs::{adapter::ReseedingRng, OsRng};
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha12Core;

    use crate::{MonotonicClockSequence, RandSource};

    /// The random number generator of the global generator.
    ///
    /// Employs [`ChaCha12Core`] with [`ReseedingRng`] wrapper to emulate the strategy used by
    /// [`rand::rngs::ThreadRng`] while remaining `Send`.
    pub struct GlobalGenRng(ReseedingRng<ChaCha12Core, OsRng>);

    impl GlobalGenRng {
        pub(super) fn from_entropy() -> Self {
            Self(ReseedingRng::new(
                ChaCha12Core::from_entropy(),
                1024 * 64,
                OsRng,
            ))
        }
    }

    impl RandSource for GlobalGenRng {
        fn next_u64(&mut self) -> u64 {
            self.0.next_u64()
        }
    }

    impl fmt::Debug for GlobalGenRng {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("GlobalGenRng").finish_non_exhaustive()
        }
    }

    /// A thin wrapper to replace the generator when the process ID changes (i.e., upon Unix
    /// forks).
    #[derive(Debug)]
    pub struct GlobalGenInner {
        #[cfg(unix)]
        pid: u32,
        generator: MonotonicClockSequence<GlobalGenRng>,
    }

    impl Default for GlobalGenInner {
        fn default() -> Self {
            Self {
                #[cfg(unix)]
                pid: std::process::id(),
                generator: MonotonicClockSequence::new(GlobalGenRng::from_entropy()),
            }
        }
    }

    impl GlobalGenInner {
        /// Returns a reference to the inner [`MonotonicClockSequence`] instance, replacing the
        /// generator on Unix if the process ID has changed.
        pub fn get(&mut self) -> &MonotonicClockSequence<GlobalGenRng> {
            #[cfg(unix)]
            if self.pid != std::process::id() {
                tracing::debug!(
                    old_pid = self.pid,
                    new_pid = std::process::id(),
                    "process id changed; re-creating global generator"
                );
                *self = Default::default();
            }
            &self.generator
        }
    }
}
