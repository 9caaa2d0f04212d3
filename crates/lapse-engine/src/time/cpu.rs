//! CPU-time readings via `clock_gettime`.

#[cfg(any(target_os = "linux", target_os = "android", target_os = "macos", target_os = "freebsd"))]
mod imp {
    fn read(id: libc::clockid_t) -> Result<i64, String> {
        let mut ts = libc::timespec { tv_sec: 0, tv_nsec: 0 };
        // SAFETY: `ts` is a valid, writable timespec for the duration of the call.
        let rc = unsafe { libc::clock_gettime(id, &mut ts) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error().to_string());
        }
        Ok((ts.tv_sec as i64)
            .saturating_mul(1_000_000_000)
            .saturating_add(ts.tv_nsec as i64))
    }

    pub fn thread_cputime() -> Result<i64, String> {
        read(libc::CLOCK_THREAD_CPUTIME_ID)
    }

    pub fn process_cputime() -> Result<i64, String> {
        read(libc::CLOCK_PROCESS_CPUTIME_ID)
    }
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "macos", target_os = "freebsd")))]
mod imp {
    pub fn thread_cputime() -> Result<i64, String> {
        Err("per-thread CPU time clock is not available".into())
    }

    pub fn process_cputime() -> Result<i64, String> {
        Err("process CPU time clock is not available".into())
    }
}

pub(crate) use imp::{process_cputime, thread_cputime};
