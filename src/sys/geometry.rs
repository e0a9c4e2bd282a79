//! Plain geometry types for window frames.
//!
//! Window servers deal in fractional pixels, so everything here is f64.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn round(self) -> Point {
        Point::new(self.x.round(), self.y.round())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Size {
        Size { width, height }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Rect {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn min(&self) -> Point {
        self.origin
    }

    pub fn max(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width,
            self.origin.y + self.size.height,
        )
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn round(&self) -> Rect {
        let min = self.min().round();
        let max = self.max().round();
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.min().x..=self.max().x).contains(&point.x)
            && (self.min().y..=self.max().y).contains(&point.y)
    }

    pub fn area(&self) -> f64 {
        self.size.width * self.size.height
    }
}

pub trait IsWithin {
    fn is_within(&self, how_much: f64, other: Self) -> bool;
}

impl IsWithin for f64 {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        (self - other).abs() < how_much
    }
}

impl IsWithin for Point {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.x.is_within(how_much, other.x) && self.y.is_within(how_much, other.y)
    }
}

impl IsWithin for Size {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.width.is_within(how_much, other.width)
            && self.height.is_within(how_much, other.height)
    }
}

impl IsWithin for Rect {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.origin.is_within(how_much, other.origin) && self.size.is_within(how_much, other.size)
    }
}

pub trait SameAs: IsWithin + Sized {
    fn same_as(&self, other: Self) -> bool {
        self.is_within(0.1, other)
    }
}

impl SameAs for Point {}
impl SameAs for Size {}
impl SameAs for Rect {}
