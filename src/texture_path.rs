// SPDX-FileCopyrightText: 2025 Joshua Goins <josh@redstrate.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use std::sync::LazyLock;

use regex::Regex;

/// The kinds of texture folders that carry an id the game uses to find an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathFamily {
    /// `/Assets/pes16/model/character/face/real/<5 digit player id>/...`
    Face,
    /// `/Assets/pes16/model/character/referee/referee<3 digits>/...`
    Referee,
    /// `/Assets/pes16/model/character/boots/k<4 digits>/...`
    Boots,
    /// `/Assets/pes16/model/character/glove/g<4 digits>/...`
    Gloves,
    /// `/Assets/pes16/model/ball/ball<3 digits>/...`
    Ball,
    /// `/Assets/pes16/model/character/common/<3 digit team id>/...`
    Common,
}

impl PathFamily {
    pub fn name(self) -> &'static str {
        match self {
            PathFamily::Face => "face",
            PathFamily::Referee => "referee",
            PathFamily::Boots => "boots",
            PathFamily::Gloves => "gloves",
            PathFamily::Ball => "ball",
            PathFamily::Common => "common",
        }
    }

    /// Common folders are keyed by the team, everything else by the asset's own id.
    fn uses_team_context(self) -> bool {
        self == PathFamily::Common
    }
}

struct FamilyMatcher {
    family: PathFamily,
    /// Number of `/`-separated segments, counting the empty one before the leading slash.
    segments: usize,
    id_segment: usize,
    id_shape: Regex,
}

impl FamilyMatcher {
    fn new(family: PathFamily, segments: usize, id_segment: usize, id_shape: &str) -> Self {
        Self {
            family,
            segments,
            id_segment,
            id_shape: Regex::new(id_shape).expect("id patterns are valid regexes"),
        }
    }

    fn matches(&self, segments: &[&str]) -> bool {
        segments.len() == self.segments && self.id_shape.is_match(segments[self.id_segment])
    }
}

// Checked in order: several families share a segment count and only differ by the id shape.
static FAMILIES: LazyLock<Vec<FamilyMatcher>> = LazyLock::new(|| {
    vec![
        FamilyMatcher::new(PathFamily::Face, 9, 7, r"^\d{5}$"),
        FamilyMatcher::new(PathFamily::Referee, 8, 6, r"^referee\d{3}$"),
        FamilyMatcher::new(PathFamily::Boots, 8, 6, r"^k\d{4}$"),
        FamilyMatcher::new(PathFamily::Gloves, 8, 6, r"^g\d{4}$"),
        FamilyMatcher::new(PathFamily::Ball, 7, 5, r"^ball\d{3}$"),
        FamilyMatcher::new(PathFamily::Common, 8, 6, r"^\d{3}$"),
    ]
});

/// What happened to a single texture path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRewrite {
    /// The id segment was replaced.
    Rewritten(String),
    /// The path belongs to `family`, but `value` doesn't have the shape of an id for it.
    InvalidId { family: PathFamily, value: String },
    /// The path doesn't carry an id.
    NoIdFound,
}

fn split(path: &str) -> (Vec<&str>, bool) {
    let trailing_slash = path.ends_with('/');
    let trimmed = if trailing_slash {
        &path[..path.len() - 1]
    } else {
        path
    };

    (trimmed.split('/').collect(), trailing_slash)
}

/// Finds which id-carrying folder `path` points into, if any.
pub fn classify(path: &str) -> Option<PathFamily> {
    let (segments, _) = split(path);

    FAMILIES
        .iter()
        .find(|matcher| matcher.matches(&segments))
        .map(|matcher| matcher.family)
}

/// Replaces the id segment of `path` with `new_id`, or with `team_context` for common folders.
///
/// The replacement has to have the same shape as the id it replaces, so a face folder only takes
/// a five digit id and so on.
pub fn rewrite_texture_path(path: &str, new_id: &str, team_context: &str) -> PathRewrite {
    let (mut segments, trailing_slash) = split(path);

    let Some(matcher) = FAMILIES.iter().find(|matcher| matcher.matches(&segments)) else {
        return PathRewrite::NoIdFound;
    };

    let value = if matcher.family.uses_team_context() {
        team_context
    } else {
        new_id
    };

    if !matcher.id_shape.is_match(value) {
        return PathRewrite::InvalidId {
            family: matcher.family,
            value: value.to_string(),
        };
    }

    segments[matcher.id_segment] = value;

    let mut rewritten = segments.join("/");
    if trailing_slash {
        rewritten.push('/');
    }

    PathRewrite::Rewritten(rewritten)
}
