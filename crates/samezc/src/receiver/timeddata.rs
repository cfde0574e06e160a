/// Time-sensitive data with an expiration time
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimedData<D> {
    /// Data
    pub data: D,

    /// Deadline or expiration time, as a lifetime input sample count
    pub deadline: u64,
}

impl<D> TimedData<D> {
    /// Store `data` with the given `deadline`
    pub fn with_deadline(data: D, deadline: u64) -> Self {
        TimedData { data, deadline }
    }

    /// Check for expiration
    ///
    /// The data expires *at* its deadline.
    pub fn is_expired_at(&self, now: u64) -> bool {
        self.deadline <= now
    }
}

impl<D> AsRef<D> for TimedData<D> {
    fn as_ref(&self) -> &D {
        &self.data
    }
}

impl<D> AsMut<D> for TimedData<D> {
    fn as_mut(&mut self) -> &mut D {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry() {
        let mut td = TimedData::with_deadline(vec![1u8], 100);
        assert!(!td.is_expired_at(99));
        assert!(td.is_expired_at(100));
        td.as_mut().push(2);
        assert_eq!(&vec![1u8, 2], td.as_ref());
    }
}
