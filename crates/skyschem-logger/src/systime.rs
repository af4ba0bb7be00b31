use std::time::{SystemTime, UNIX_EPOCH};

/// Returns the local time as YYYY-MM-DD HH:MM:SS TZ
#[cfg(unix)]
pub fn now() -> String {
    use std::ffi::CStr;

    let secs = unix_timestamp() as libc::time_t;
    let mut tm: libc::tm = unsafe { std::mem::zeroed() };
    let mut buf = [0 as libc::c_char; 64];

    unsafe {
        if libc::localtime_r(&secs, &mut tm).is_null() {
            return secs.to_string();
        }
        let written = libc::strftime(
            buf.as_mut_ptr(),
            buf.len(),
            b"%Y-%m-%d %H:%M:%S %Z\0".as_ptr() as *const libc::c_char,
            &tm,
        );
        if written == 0 {
            return secs.to_string();
        }
        CStr::from_ptr(buf.as_ptr()).to_string_lossy().into_owned()
    }
}

/// Returns the local time as YYYY-MM-DD HH:MM:SS
#[cfg(windows)]
pub fn now() -> String {
    use windows_sys::Win32::Foundation::SYSTEMTIME;
    use windows_sys::Win32::System::SystemInformation::GetLocalTime;

    let mut st: SYSTEMTIME = unsafe { std::mem::zeroed() };
    unsafe { GetLocalTime(&mut st) };
    format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        st.wYear, st.wMonth, st.wDay, st.wHour, st.wMinute, st.wSecond
    )
}

/// Seconds since the unix epoch; 0 if the clock is before it.
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
