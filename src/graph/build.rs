use std::collections::HashMap;
use std::sync::Arc;

use crate::cookies::Cookie;

use super::{CookieGraph, GraphLink, GraphNode};

/// Builds the bipartite domain/cookie graph for one snapshot.
///
/// Domain nodes come first in first-seen order, then one cookie node per
/// record in input order, each linked from its domain.
pub fn build_graph(cookies: &[Cookie]) -> CookieGraph {
    let mut domain_order = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for cookie in cookies {
        let count = counts.entry(cookie.domain.as_str()).or_insert_with(|| {
            domain_order.push(cookie.domain.as_str());
            0
        });
        *count += 1;
    }

    let mut nodes = Vec::with_capacity(domain_order.len() + cookies.len());
    for domain in &domain_order {
        nodes.push(GraphNode::domain(domain, counts[domain]));
    }

    let mut links = Vec::with_capacity(cookies.len());
    for (index, cookie) in cookies.iter().enumerate() {
        let node = GraphNode::cookie(index, Arc::new(cookie.clone()));
        links.push(GraphLink {
            source: format!("domain:{}", cookie.domain),
            target: node.id.clone(),
        });
        nodes.push(node);
    }

    CookieGraph { nodes, links }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::cookies::test_cookie;
    use crate::graph::{GraphStats, NodeKind};

    fn scenario() -> Vec<Cookie> {
        vec![
            test_cookie("a", "x.com"),
            test_cookie("b", "x.com"),
            test_cookie("c", "y.com"),
        ]
    }

    fn link(source: &str, target: &str) -> GraphLink {
        GraphLink {
            source: source.to_owned(),
            target: target.to_owned(),
        }
    }

    #[test]
    fn empty_input_builds_empty_graph() {
        let graph = build_graph(&[]);
        assert!(graph.is_empty());
        assert!(graph.links.is_empty());
        assert_eq!(graph.stats(), GraphStats::default());
    }

    #[test]
    fn two_domains_three_cookies() {
        let graph = build_graph(&scenario());

        let domains = graph
            .nodes
            .iter()
            .filter_map(|node| match node.kind {
                NodeKind::Domain { count } => Some((node.name.as_str(), count)),
                NodeKind::Cookie { .. } => None,
            })
            .collect::<HashSet<_>>();
        assert_eq!(domains, HashSet::from([("x.com", 2), ("y.com", 1)]));

        let cookies = graph
            .nodes
            .iter()
            .filter(|node| !node.is_domain())
            .map(|node| (node.id.as_str(), node.name.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            cookies,
            vec![("cookie:0", "a"), ("cookie:1", "b"), ("cookie:2", "c")]
        );

        let links = graph.links.iter().cloned().collect::<HashSet<_>>();
        assert_eq!(
            links,
            HashSet::from([
                link("domain:x.com", "cookie:0"),
                link("domain:x.com", "cookie:1"),
                link("domain:y.com", "cookie:2"),
            ])
        );

        assert_eq!(
            graph.stats(),
            GraphStats {
                total_cookies: 3,
                total_domains: 2,
                connections: 3,
            }
        );
    }

    #[test]
    fn every_link_endpoint_exists_with_the_right_kind() {
        let mut cookies = scenario();
        cookies.push(test_cookie("d", "z.org"));
        cookies.push(test_cookie("e", "x.com"));
        let graph = build_graph(&cookies);

        let domain_ids = graph
            .nodes
            .iter()
            .filter(|node| node.is_domain())
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        let cookie_ids = graph
            .nodes
            .iter()
            .filter(|node| !node.is_domain())
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();

        assert_eq!(domain_ids.len(), 3);
        assert_eq!(cookie_ids.len(), cookies.len());
        assert_eq!(graph.links.len(), cookies.len());
        for link in &graph.links {
            assert!(domain_ids.contains(link.source.as_str()));
            assert!(cookie_ids.contains(link.target.as_str()));
        }
    }

    #[test]
    fn identical_input_rebuilds_identical_sets() {
        let first = build_graph(&scenario());
        let second = build_graph(&scenario());

        let ids = |graph: &CookieGraph| {
            graph
                .nodes
                .iter()
                .map(|node| (node.id.clone(), node.kind.clone()))
                .collect::<Vec<_>>()
        };
        let first_ids = ids(&first);
        let second_ids = ids(&second);
        assert_eq!(first_ids.len(), second_ids.len());
        for entry in &first_ids {
            assert!(second_ids.contains(entry));
        }

        let first_links = first.links.into_iter().collect::<HashSet<_>>();
        let second_links = second.links.into_iter().collect::<HashSet<_>>();
        assert_eq!(first_links, second_links);
    }

    #[test]
    fn cookie_nodes_reference_their_records() {
        let graph = build_graph(&scenario());
        let record = graph
            .nodes
            .iter()
            .find(|node| node.id == "cookie:2")
            .and_then(|node| node.cookie_record())
            .unwrap();
        assert_eq!(record.domain, "y.com");
        assert_eq!(record.value, "c-value");
    }

    #[test]
    fn delete_domain_then_rebuild() {
        let remaining = scenario()
            .into_iter()
            .filter(|cookie| cookie.domain != "x.com")
            .collect::<Vec<_>>();
        let graph = build_graph(&remaining);
        assert_eq!(
            graph.stats(),
            GraphStats {
                total_cookies: 1,
                total_domains: 1,
                connections: 1,
            }
        );
    }
}
