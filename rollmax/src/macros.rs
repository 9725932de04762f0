use log::Level;
use trice::Instant;

/// Declare items that only exist in test builds.
macro_rules! cfg_test {
    ($($item:item)*) => {
        $(
            #[cfg(test)]
            $item
        )*
    }
}

macro_rules! impl_total_size_static {
    ( $($t:ty),+ $(,)? ) => {
        $( impl $crate::TotalSize for $t {
            #[inline]
            fn static_size() -> Option<usize> {
                Some(std::mem::size_of::<Self>())
            }
        })+
    }
}

/// Logs how long it lived under the caller's module path. Reads no clock at
/// all when `level` is filtered out.
pub(crate) struct Timer {
    target: &'static str,
    label: &'static str,
    level: Level,
    start: Option<Instant>,
}

impl Timer {
    pub fn new(target: &'static str, label: &'static str, level: Level) -> Self {
        let start = log::log_enabled!(target: target, level).then(Instant::now);
        Self {
            target,
            label,
            level,
            start,
        }
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.start.is_some()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if let Some(start) = self.start {
            log::log!(
                target: self.target,
                self.level,
                "{}: time elapsed {:?}",
                self.label,
                start.elapsed(),
            );
        }
    }
}

/// Time a block, logging the elapsed time at `debug` (or the given level).
macro_rules! time {
    ($level:expr, $label:expr, $b:block) => {{
        let _timer = $crate::macros::Timer::new(::std::module_path!(), $label, $level);
        $b
    }};
    ($label:expr, $b:block) => {{
        time!(::log::Level::Debug, $label, $b)
    }};
}
