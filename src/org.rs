use crate::{
    images::normalize_image_url,
    models::{ExcoMember, ExcoSection},
};
use itertools::Itertools;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: i32,
    pub name: String,
    pub position: String,
    pub image: String,
    pub email: Option<String>,
    pub linkedin: Option<String>,
}

impl From<ExcoMember> for MemberView {
    fn from(m: ExcoMember) -> Self {
        Self {
            id: m.id,
            image: normalize_image_url(m.image.as_deref().unwrap_or_default()),
            name: m.name,
            position: m.position,
            email: m.email,
            linkedin: m.linkedin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionView {
    pub id: i32,
    pub name: String,
    pub head: Option<MemberView>,
    /// Everyone in the section except the head.
    pub members: Vec<MemberView>,
}

/// Builds the organization chart. A section's head is whoever its
/// `head_member_id` points at, provided that member belongs to the section.
pub fn assemble_chart(sections: Vec<ExcoSection>, members: Vec<ExcoMember>) -> Vec<SectionView> {
    let mut by_section = members.into_iter().into_group_map_by(|m| m.section_id);

    let chart = sections
        .into_iter()
        .sorted_by_key(|s| (s.display_order, s.id))
        .map(|section| {
            let mut group = by_section.remove(&section.id).unwrap_or_default();
            group.sort_by(|a, b| (a.display_order, &a.name).cmp(&(b.display_order, &b.name)));

            let head = section.head_member_id.and_then(|head_id| {
                match group.iter().position(|m| m.id == head_id) {
                    Some(idx) => Some(MemberView::from(group.remove(idx))),
                    None => {
                        warn!(section_id = section.id, head_id, "section head is not a member of the section");
                        None
                    }
                }
            });

            SectionView {
                id: section.id,
                name: section.name,
                head,
                members: group.into_iter().map(MemberView::from).collect(),
            }
        })
        .collect();

    for (section_id, orphans) in by_section {
        warn!(section_id, count = orphans.len(), "members reference a missing section");
    }

    chart
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::DEFAULT_AVATAR;

    fn section(id: i32, name: &str, order: i32, head: Option<i32>) -> ExcoSection {
        ExcoSection {
            id,
            name: name.to_string(),
            display_order: order,
            head_member_id: head,
        }
    }

    fn member(id: i32, section_id: i32, name: &str, order: i32) -> ExcoMember {
        ExcoMember {
            id,
            section_id,
            name: name.to_string(),
            position: "Member".to_string(),
            image: None,
            display_order: order,
            email: None,
            linkedin: None,
        }
    }

    #[test]
    fn head_comes_from_the_section_reference() {
        let chart = assemble_chart(
            vec![section(1, "Core", 0, Some(11))],
            vec![member(10, 1, "Ana", 0), member(11, 1, "Ben", 1), member(12, 1, "Cy", 2)],
        );

        assert_eq!(chart.len(), 1);
        assert_eq!(chart[0].head.as_ref().unwrap().name, "Ben");
        let names: Vec<_> = chart[0].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Cy"]);
    }

    #[test]
    fn dangling_head_reference_means_no_head() {
        let chart = assemble_chart(
            vec![section(1, "Core", 0, Some(99)), section(2, "Media", 1, None)],
            vec![member(10, 1, "Ana", 0), member(99, 2, "Zed", 0)],
        );

        assert!(chart[0].head.is_none());
        assert_eq!(chart[0].members.len(), 1);
        assert!(chart[1].head.is_none());
        assert_eq!(chart[1].members[0].name, "Zed");
    }

    #[test]
    fn sections_and_members_follow_display_order() {
        let chart = assemble_chart(
            vec![section(1, "Events", 2, None), section(2, "Core", 1, None)],
            vec![member(1, 1, "Zoe", 0), member(2, 1, "Amy", 5), member(3, 1, "Bob", 0)],
        );

        assert_eq!(chart[0].name, "Core");
        let names: Vec<_> = chart[1].members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Zoe", "Amy"]);
    }

    #[test]
    fn member_images_are_normalized() {
        let mut with_image = member(1, 1, "Ana", 0);
        with_image.image = Some("images/ana.png".to_string());
        let chart = assemble_chart(
            vec![section(1, "Core", 0, None)],
            vec![with_image, member(2, 1, "Ben", 1)],
        );

        assert_eq!(chart[0].members[0].image, "/images/ana.png");
        assert_eq!(chart[0].members[1].image, DEFAULT_AVATAR);
    }

    #[test]
    fn members_of_unknown_sections_are_dropped() {
        let chart = assemble_chart(vec![section(1, "Core", 0, None)], vec![member(1, 7, "Ana", 0)]);
        assert!(chart[0].members.is_empty());
    }
}
