//! Names and subjects: `origination` and `controlaccess`.

use ead_model::{AgentLink, AgentRole, Subject, SubjectLink, Visibility};

use super::Session;
use crate::error::Result;
use crate::mapping::{
    SubjectMapping, SubjectNode, agent_head, agent_subject_encoding, agent_tag, geogname_encoding,
    origination_encoding, subject_mapping,
};
use crate::sanitize::write_mixed_content;
use crate::stream::{Attrs, Emitter};

/// Agents count as published only when explicitly marked so.
fn agent_exported(s: &Session<'_>, link: &AgentLink) -> bool {
    link.is_explicitly_published() || s.include_unpublished()
}

/// Creators and sources. The first person and the first corporate body of
/// the document get the main-entry analogs, later ones the added-entry ones.
pub(super) fn write_origination(
    s: &mut Session<'_>,
    out: &mut Emitter,
    links: &[AgentLink],
) -> Result<()> {
    for link in links {
        let (Some(label), Some(tag)) = (
            link.role.origination_label(),
            agent_tag(link.agent.agent_type),
        ) else {
            continue;
        };
        if !agent_exported(s, link) {
            continue;
        }
        let published = link.is_explicitly_published();
        let origination = Attrs::new().with("label", label).audience(!published);
        out.start("origination", &origination)?;

        let first = match tag {
            "persname" => std::mem::replace(&mut s.first_persname, false),
            "corpname" => std::mem::replace(&mut s.first_corpname, false),
            _ => false,
        };
        let name = &link.agent.display_name;
        let attrs = Attrs::new()
            .opt("role", link.relator.as_deref())
            .opt("source", name.source.as_deref())
            .opt("rules", name.rules.as_deref())
            .opt("authfilenumber", name.authority_id.as_deref())
            .opt("encodinganalog", origination_encoding(tag, first));
        s.mixed_element(out, tag, &attrs, &name.sort_name, false)?;

        out.end("origination")?;
    }
    Ok(())
}

/// Subject headings grouped by element, then subject agents grouped by
/// element; one `controlaccess` per group.
pub(super) fn write_controlaccess(
    s: &mut Session<'_>,
    out: &mut Emitter,
    subjects: &[SubjectLink],
    agents: &[AgentLink],
) -> Result<()> {
    let subjects: Vec<(SubjectMapping, &Subject)> = subjects
        .iter()
        .filter(|link| s.visible(*link))
        .filter_map(|link| {
            let term_type = link.subject.primary_term_type()?;
            Some((subject_mapping(term_type), &link.subject))
        })
        .collect();
    let agents: Vec<(&'static str, &AgentLink)> = agents
        .iter()
        .filter(|link| link.role == AgentRole::Subject && agent_exported(s, link))
        .filter_map(|link| Some((agent_tag(link.agent.agent_type)?, link)))
        .collect();

    for node in first_seen(subjects.iter().map(|(mapping, _)| mapping.node)) {
        out.start("controlaccess", &Attrs::new())?;
        write_head(out, node.head())?;
        for (mapping, subject) in subjects.iter().filter(|(m, _)| m.node == node) {
            write_subject(s, out, mapping, subject)?;
        }
        out.end("controlaccess")?;
    }

    for tag in first_seen(agents.iter().map(|(tag, _)| *tag)) {
        out.start("controlaccess", &Attrs::new())?;
        write_head(out, agent_head(tag))?;
        for (_, link) in agents.iter().filter(|(t, _)| *t == tag) {
            let name = &link.agent.display_name;
            let mut attrs = Attrs::new()
                .opt("role", link.relator.as_deref())
                .opt("source", name.source.as_deref())
                .opt("rules", name.rules.as_deref())
                .opt("authfilenumber", name.authority_id.as_deref())
                .audience(!link.is_explicitly_published());
            if let Some(analog) = agent_subject_encoding(tag) {
                attrs.set("encodinganalog", analog);
                attrs.set("role", "subject");
            }
            s.mixed_element(out, tag, &attrs, &link.heading(), false)?;
        }
        out.end("controlaccess")?;
    }
    Ok(())
}

fn write_subject(
    s: &mut Session<'_>,
    out: &mut Emitter,
    mapping: &SubjectMapping,
    subject: &Subject,
) -> Result<()> {
    let mut attrs = Attrs::new()
        .opt("source", subject.source.as_deref())
        .opt("authfilenumber", subject.authority_id.as_deref())
        .audience(subject.is_unpublished());
    match (mapping.node, mapping.unknown.as_deref()) {
        (_, Some(raw)) => attrs.set("unknownnodename", raw),
        (SubjectNode::Geogname, None) => {
            let first = std::mem::replace(&mut s.first_geogname, false);
            let (analog, role) = geogname_encoding(first);
            attrs.set("encodinganalog", analog);
            attrs.set("role", role);
            if let Some(normal) = subject.normal.as_deref().filter(|n| !n.is_empty()) {
                attrs.set("normal", normal);
            }
        }
        (node, None) => match node.encoding_analog() {
            Some(analog) => attrs.set("encodinganalog", analog),
            None => attrs.set("unknownnodename", node.tag()),
        },
    }
    let tag = mapping.node.tag();
    out.start(tag, &attrs)?;
    write_mixed_content(out, &subject.heading(), false)?;
    out.end(tag)
}

fn write_head(out: &mut Emitter, head: &str) -> Result<()> {
    if head.is_empty() {
        return Ok(());
    }
    out.text_element("head", &Attrs::new(), head)
}

/// Distinct values in order of first appearance.
fn first_seen<T: PartialEq>(items: impl Iterator<Item = T>) -> Vec<T> {
    let mut seen = Vec::new();
    for item in items {
        if !seen.contains(&item) {
            seen.push(item);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_keeps_order() {
        assert_eq!(first_seen([3, 1, 3, 2, 1].into_iter()), vec![3, 1, 2]);
    }
}
