//! Mirror-element measurement.
//!
//! A mirror is an off-screen copy of the text field with identical font,
//! padding and wrapping, used to find where the caret lands after layout.
//! Hosts that own a real layout engine implement [`MirrorHost`]; the server
//! ships [`MonospaceMirror`] for fixed-width fields and [`UnavailableMirror`]
//! for environments with no layout at all.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use thiserror::Error;

/// Style copied from the real field onto the mirror.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MirrorStyle {
    pub font_size: f32,
    pub line_height: f32,
    /// Advance of one character, in pixels.
    pub char_width: f32,
    /// Width available for text after padding is removed.
    pub content_width: f32,
}

/// Opaque identifier for a mounted mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MirrorHandle(u64);

/// Marker box relative to the mirror's content origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerRect {
    pub top: f32,
    pub left: f32,
    pub height: f32,
}

#[derive(Debug, Error)]
pub enum MeasureError {
    #[error("no layout engine available for mirror measurement")]
    Unavailable,
    #[error("mirror {0:?} is not mounted")]
    NotMounted(MirrorHandle),
    #[error("mirror has no usable width ({0}px)")]
    ZeroWidth(f32),
}

/// Something that can lay out text in a hidden element and measure it.
///
/// All methods are synchronous; a measurement must finish within the call.
pub trait MirrorHost {
    fn mount(&self, style: &MirrorStyle) -> Result<MirrorHandle, MeasureError>;

    /// Lay out `text_before` followed by a zero-width marker and return the
    /// marker's box.
    fn measure_marker(&self, handle: MirrorHandle, text_before: &str) -> Result<MarkerRect, MeasureError>;

    fn unmount(&self, handle: MirrorHandle);
}

/// A mounted mirror, unmounted when dropped.
pub struct MirrorGuard<'h, H: MirrorHost + ?Sized> {
    host: &'h H,
    handle: MirrorHandle,
}

impl<'h, H: MirrorHost + ?Sized> MirrorGuard<'h, H> {
    pub fn mount(host: &'h H, style: &MirrorStyle) -> Result<Self, MeasureError> {
        let handle = host.mount(style)?;
        Ok(Self { host, handle })
    }

    pub fn measure(&self, text_before: &str) -> Result<MarkerRect, MeasureError> {
        self.host.measure_marker(self.handle, text_before)
    }
}

impl<H: MirrorHost + ?Sized> Drop for MirrorGuard<'_, H> {
    fn drop(&mut self) {
        self.host.unmount(self.handle);
    }
}

/// Host for environments without any layout engine.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableMirror;

impl MirrorHost for UnavailableMirror {
    fn mount(&self, _style: &MirrorStyle) -> Result<MirrorHandle, MeasureError> {
        Err(MeasureError::Unavailable)
    }

    fn measure_marker(&self, _handle: MirrorHandle, _text_before: &str) -> Result<MarkerRect, MeasureError> {
        Err(MeasureError::Unavailable)
    }

    fn unmount(&self, _handle: MirrorHandle) {}
}

/// Lays text out on a fixed character grid.
///
/// Emulates `white-space: pre-wrap; word-break: break-all`: explicit newlines
/// start a new row and a row that is full wraps before the next character.
#[derive(Debug, Default)]
pub struct MonospaceMirror {
    next_handle: AtomicU64,
    mounted: DashMap<MirrorHandle, MirrorStyle>,
}

impl MonospaceMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mirrors currently mounted.
    pub fn live_mirrors(&self) -> usize {
        self.mounted.len()
    }
}

impl MirrorHost for MonospaceMirror {
    fn mount(&self, style: &MirrorStyle) -> Result<MirrorHandle, MeasureError> {
        if style.char_width <= 0.0 || style.content_width < style.char_width {
            return Err(MeasureError::ZeroWidth(style.content_width));
        }
        let handle = MirrorHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.mounted.insert(handle, *style);
        Ok(handle)
    }

    fn measure_marker(&self, handle: MirrorHandle, text_before: &str) -> Result<MarkerRect, MeasureError> {
        let style = self
            .mounted
            .get(&handle)
            .map(|s| *s)
            .ok_or(MeasureError::NotMounted(handle))?;

        let columns = (style.content_width / style.char_width).floor() as usize;
        let mut row = 0usize;
        let mut col = 0usize;
        for c in text_before.chars() {
            if c == '\n' {
                row += 1;
                col = 0;
                continue;
            }
            if col == columns {
                row += 1;
                col = 0;
            }
            col += 1;
        }

        Ok(MarkerRect {
            top: row as f32 * style.line_height,
            left: col as f32 * style.char_width,
            height: style.line_height,
        })
    }

    fn unmount(&self, handle: MirrorHandle) {
        self.mounted.remove(&handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(content_width: f32) -> MirrorStyle {
        MirrorStyle {
            font_size: 10.0,
            line_height: 20.0,
            char_width: 10.0,
            content_width,
        }
    }

    /// Host whose measurement always fails after a successful mount.
    #[derive(Default)]
    struct FailingHost {
        inner: MonospaceMirror,
    }

    impl MirrorHost for FailingHost {
        fn mount(&self, style: &MirrorStyle) -> Result<MirrorHandle, MeasureError> {
            self.inner.mount(style)
        }

        fn measure_marker(&self, _handle: MirrorHandle, _text: &str) -> Result<MarkerRect, MeasureError> {
            Err(MeasureError::Unavailable)
        }

        fn unmount(&self, handle: MirrorHandle) {
            self.inner.unmount(handle)
        }
    }

    #[test]
    fn guard_unmounts_after_measurement() {
        let host = MonospaceMirror::new();
        {
            let guard = MirrorGuard::mount(&host, &style(100.0)).unwrap();
            assert_eq!(host.live_mirrors(), 1);
            guard.measure("abc").unwrap();
        }
        assert_eq!(host.live_mirrors(), 0);
    }

    #[test]
    fn guard_unmounts_when_measurement_fails() {
        let host = FailingHost::default();
        let result = MirrorGuard::mount(&host, &style(100.0)).and_then(|g| g.measure("abc"));
        assert!(result.is_err());
        assert_eq!(host.inner.live_mirrors(), 0);
    }

    #[test]
    fn failed_mount_leaves_nothing_behind() {
        let host = MonospaceMirror::new();
        assert!(matches!(
            MirrorGuard::mount(&host, &style(5.0)),
            Err(MeasureError::ZeroWidth(_))
        ));
        assert_eq!(host.live_mirrors(), 0);
    }

    #[test]
    fn unavailable_host_never_mounts() {
        assert!(matches!(
            MirrorGuard::mount(&UnavailableMirror, &style(100.0)),
            Err(MeasureError::Unavailable)
        ));
    }

    #[test]
    fn measuring_unknown_handle_fails() {
        let host = MonospaceMirror::new();
        let handle = host.mount(&style(100.0)).unwrap();
        host.unmount(handle);
        assert!(matches!(
            host.measure_marker(handle, "x"),
            Err(MeasureError::NotMounted(_))
        ));
    }

    #[test]
    fn marker_follows_newlines() {
        let host = MonospaceMirror::new();
        let guard = MirrorGuard::mount(&host, &style(100.0)).unwrap();
        let rect = guard.measure("one\ntwo @a").unwrap();
        assert_eq!(rect.top, 20.0);
        assert_eq!(rect.left, 60.0);
    }

    #[test]
    fn marker_wraps_full_rows() {
        let host = MonospaceMirror::new();
        // 4 columns
        let guard = MirrorGuard::mount(&host, &style(45.0)).unwrap();
        let rect = guard.measure("abcdef").unwrap();
        assert_eq!(rect.top, 20.0);
        assert_eq!(rect.left, 20.0);

        let rect = guard.measure("abcd").unwrap();
        assert_eq!(rect.top, 0.0);
        assert_eq!(rect.left, 40.0);
    }
}
