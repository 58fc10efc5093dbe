/// Integer axis-aligned rectangles in world units.
///
/// Origin is the top-left corner and `y` grows downward, so `bottom()` is
/// the larger y edge. Overlap is strict: rectangles that merely share an
/// edge do not overlap, and a rectangle with zero width or height never
/// overlaps anything.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect { x, y, w, h }
    }

    /// Rectangle of size `w`×`h` whose center is `(cx, cy)`.
    /// Half sizes round down, so odd sizes lean toward the bottom-right.
    pub const fn centered(cx: i32, cy: i32, w: i32, h: i32) -> Self {
        Rect { x: cx - w / 2, y: cy - h / 2, w, h }
    }

    #[inline]
    pub fn left(&self) -> i32 { self.x }
    #[inline]
    pub fn right(&self) -> i32 { self.x + self.w }
    #[inline]
    pub fn top(&self) -> i32 { self.y }
    #[inline]
    pub fn bottom(&self) -> i32 { self.y + self.h }

    /// Move the rectangle so its bottom edge sits at `bottom`.
    #[inline]
    pub fn set_bottom(&mut self, bottom: i32) {
        self.y = bottom - self.h;
    }

    /// Copy of this rectangle displaced by `(dx, dy)`.
    #[inline]
    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect { x: self.x + dx, y: self.y + dy, ..*self }
    }

    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.w > 0 && self.h > 0 && other.w > 0 && other.h > 0
            && self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}
