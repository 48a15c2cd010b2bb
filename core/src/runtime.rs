use std::sync::OnceLock;

static THREAD_POOL_SIZE: OnceLock<usize> = OnceLock::new();

/// Initializes the global rayon pool once, before any parallel work runs.
///
/// Thread count resolution order: explicit argument, then the
/// `FRAMELAB_CPU_THREADS` environment variable, then rayon's default.
/// Zero and unparsable values are ignored. Later calls are no-ops.
pub fn init_global_thread_pool(threads: Option<usize>) -> usize {
    *THREAD_POOL_SIZE.get_or_init(|| {
        let requested = threads.filter(|&n| n > 0).or_else(|| {
            std::env::var("FRAMELAB_CPU_THREADS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .filter(|&n| n > 0)
        });

        if let Some(n) = requested {
            // A failed build means another pool already won the race;
            // fall through to whatever is active.
            if rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build_global()
                .is_ok()
            {
                return n;
            }
        }
        rayon::current_num_threads()
    })
}

/// Number of worker threads the global pool was pinned to, if it has
/// been initialized through [`init_global_thread_pool`].
pub fn current_cpu_threads() -> Option<usize> {
    THREAD_POOL_SIZE.get().copied()
}
