//! # Pattern router
//!
//! [`RegexRouter`] keeps an ordered table of `(pattern, handler)` rules
//! and matches message names against it.
//!
//! # Building
//!
//! Rules are added with the two-step `route(pattern)` / `to(handler)`
//! binding, or all at once with [`RegexRouter::from_routes`] or the
//! [`regex_routes!`](crate::regex_routes) macro:
//!
//! ```rust,ignore
//! let mut router = RegexRouter::new();
//! router
//!     .route(r"/^order\..*/")?
//!     .to("order-handler")?
//!     .route("/^payment\\./i")?
//!     .to("payment-handler")?;
//! ```
//!
//! # Patterns
//!
//! Patterns use `regex` syntax and may be wrapped in `/…/flags`
//! delimiters (`i`, `m`, `s`, `x`, `u`). A pattern must match the whole
//! message name.
//!
//! # Dispatch
//!
//! | Kind | Behavior |
//! |------|----------|
//! | Command / Query | At most one pattern may match; two distinct matches are an error |
//! | Event | Every matching rule adds its handler as a listener, in table order |

use regex::Regex;
use switchyard_core::{
    Dispatch, HandlerRef, InvalidArgument, Message, MessageKind, RouteListener, RuntimeError,
    SwitchyardError,
};

/// One `(pattern, handler)` binding.
pub struct Rule<M> {
    pattern: String,
    regex: Regex,
    handler: HandlerRef<M>,
}

impl<M> Rule<M> {
    /// The pattern as it was written.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The bound handler.
    pub fn handler(&self) -> &HandlerRef<M> {
        &self.handler
    }

    /// Whether the pattern matches the whole of `name`.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// What a pattern routes to when building from a table.
pub enum RouteTarget<M> {
    /// A single handler.
    One(HandlerRef<M>),
    /// Several handlers, each becoming its own rule.
    Many(Vec<HandlerRef<M>>),
}

impl<M> From<HandlerRef<M>> for RouteTarget<M> {
    fn from(handler: HandlerRef<M>) -> Self {
        RouteTarget::One(handler)
    }
}

impl<M> From<Vec<HandlerRef<M>>> for RouteTarget<M> {
    fn from(handlers: Vec<HandlerRef<M>>) -> Self {
        RouteTarget::Many(handlers)
    }
}

impl<M> From<&str> for RouteTarget<M> {
    fn from(id: &str) -> Self {
        RouteTarget::One(HandlerRef::named(id))
    }
}

impl<M> From<String> for RouteTarget<M> {
    fn from(id: String) -> Self {
        RouteTarget::One(HandlerRef::Named(id))
    }
}

impl<M> From<Vec<&str>> for RouteTarget<M> {
    fn from(ids: Vec<&str>) -> Self {
        RouteTarget::Many(ids.into_iter().map(HandlerRef::named).collect())
    }
}

/// State of the `route` / `to` binding.
enum Binding {
    Idle,
    Pending { pattern: String, regex: Regex },
}

/// Routes messages by matching their names against regex patterns.
pub struct RegexRouter<M> {
    rules: Vec<Rule<M>>,
    binding: Binding,
}

impl<M> RegexRouter<M> {
    /// A pattern matching every message name.
    pub const ALL: &'static str = "/.*/";

    /// Priority the router attaches to a pipeline with.
    pub const PRIORITY: i32 = 100;

    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            binding: Binding::Idle,
        }
    }

    /// Build a router from `(pattern, target)` entries, in order.
    ///
    /// A target listing several handlers becomes one rule per handler.
    pub fn from_routes<I, P, T>(routes: I) -> Result<Self, SwitchyardError>
    where
        I: IntoIterator<Item = (P, T)>,
        P: Into<String>,
        T: Into<RouteTarget<M>>,
    {
        let mut router = Self::new();
        for (pattern, target) in routes {
            let pattern = pattern.into();
            match target.into() {
                RouteTarget::One(handler) => {
                    router.route(pattern)?.to(handler)?;
                }
                RouteTarget::Many(handlers) => {
                    for handler in handlers {
                        router.route(pattern.clone())?.to(handler)?;
                    }
                }
            }
        }
        Ok(router)
    }

    /// Open a binding for `pattern`. Must be followed by [`Self::to`].
    pub fn route(&mut self, pattern: impl Into<String>) -> Result<&mut Self, SwitchyardError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(InvalidArgument::EmptyPattern.into());
        }

        if let Binding::Pending { pattern: pending, .. } = &self.binding {
            return Err(RuntimeError::UnterminatedPatternBinding {
                pattern: pending.clone(),
            }
            .into());
        }

        let regex = compile(&pattern)?;
        self.binding = Binding::Pending { pattern, regex };
        Ok(self)
    }

    /// Bind the pending pattern to `handler`.
    pub fn to(&mut self, handler: impl Into<HandlerRef<M>>) -> Result<&mut Self, SwitchyardError> {
        let handler = handler.into();
        handler.validate()?;

        match std::mem::replace(&mut self.binding, Binding::Idle) {
            Binding::Pending { pattern, regex } => {
                self.rules.push(Rule {
                    pattern,
                    regex,
                    handler,
                });
                Ok(self)
            }
            Binding::Idle => Err(RuntimeError::UnboundPattern {
                handler: handler.describe(),
            }
            .into()),
        }
    }

    /// The pattern waiting for a handler, if any.
    pub fn pending_pattern(&self) -> Option<&str> {
        match &self.binding {
            Binding::Pending { pattern, .. } => Some(pattern),
            Binding::Idle => None,
        }
    }

    /// The rule table in match order.
    pub fn rules(&self) -> &[Rule<M>] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Find the single rule matching a command or query name.
    ///
    /// A rule repeating the first match's pattern and handler exactly is
    /// not a conflict. The same pattern bound to a different handler is,
    /// and is reported with that pattern as both `first` and `second`.
    pub fn resolve(&self, name: &str) -> Result<Option<&Rule<M>>, RuntimeError> {
        let mut matched: Option<&Rule<M>> = None;

        for rule in self.rules.iter().filter(|rule| rule.matches(name)) {
            match matched {
                None => matched = Some(rule),
                Some(first) if first.pattern == rule.pattern && first.handler == rule.handler => {}
                Some(first) => {
                    return Err(RuntimeError::AmbiguousRoute {
                        message_name: name.to_owned(),
                        first: first.pattern.clone(),
                        second: rule.pattern.clone(),
                    });
                }
            }
        }

        Ok(matched)
    }

    /// Every rule matching an event name, in table order.
    pub fn resolve_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Rule<M>> + 'a {
        self.rules.iter().filter(move |rule| rule.matches(name))
    }
}

impl<M> Default for RegexRouter<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Message> RouteListener<M> for RegexRouter<M> {
    fn on_route(&self, dispatch: &mut Dispatch<M>) -> Result<(), SwitchyardError> {
        let Some(name) = dispatch.message_name().filter(|name| !name.is_empty()) else {
            if dispatch.is_logging_enabled() {
                dispatch.logger().notice(&format!(
                    "RegexRouter: {} dispatch contains no message name",
                    dispatch.kind()
                ));
            }
            return Ok(());
        };

        match dispatch.kind() {
            MessageKind::Event => {
                let listeners: Vec<_> = self
                    .resolve_all(name)
                    .map(|rule| rule.handler.clone())
                    .collect();

                #[cfg(feature = "tracing")]
                tracing::debug!(event = name, listeners = listeners.len(), "routed event");

                if listeners.is_empty() {
                    return Ok(());
                }

                if let Dispatch::Event(event) = dispatch {
                    let mut slot = event.listeners_mut()?;
                    for listener in listeners {
                        slot.push(listener)?;
                    }
                }
            }
            MessageKind::Command | MessageKind::Query => {
                let Some(rule) = self.resolve(name)? else {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(message_name = name, "no route matched");
                    return Ok(());
                };

                #[cfg(feature = "tracing")]
                tracing::debug!(message_name = name, pattern = %rule.pattern, "routed message");

                dispatch.assign_exclusive(rule.handler.clone())?;
            }
        }

        Ok(())
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    fn name(&self) -> &str {
        "RegexRouter"
    }
}

/// Compile a route pattern into a whole-name matcher.
fn compile(pattern: &str) -> Result<Regex, InvalidArgument> {
    let (body, flags) = split_delimiters(pattern)?;

    let mut source = String::with_capacity(body.len() + 16);
    if !flags.is_empty() {
        source.push_str("(?");
        source.push_str(flags);
        source.push(')');
    }
    source.push_str(r"\A(?:");
    source.push_str(body);
    // In `x` mode a trailing `#` comment would swallow the closing group.
    if flags.contains('x') {
        source.push('\n');
    }
    source.push_str(r")\z");

    Regex::new(&source).map_err(|err| InvalidArgument::InvalidPattern {
        pattern: pattern.to_owned(),
        source: Box::new(err),
    })
}

/// Strip `/…/flags` delimiters, returning the body and the flags.
fn split_delimiters(pattern: &str) -> Result<(&str, &str), InvalidArgument> {
    let Some((body, flags)) = pattern
        .strip_prefix('/')
        .and_then(|rest| rest.rfind('/').map(|end| (&rest[..end], &rest[end + 1..])))
    else {
        return Ok((pattern, ""));
    };

    if let Some(flag) = flags
        .chars()
        .find(|c| !matches!(c, 'i' | 'm' | 's' | 'x' | 'u'))
    {
        return Err(InvalidArgument::InvalidPattern {
            pattern: pattern.to_owned(),
            source: format!("unsupported pattern flag `{flag}`").into(),
        });
    }
    Ok((body, flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestMessage;

    fn table() -> RegexRouter<TestMessage> {
        let mut router = RegexRouter::new();
        router
            .route(r"/^order\..*/")
            .unwrap()
            .to("orders")
            .unwrap()
            .route(RegexRouter::<TestMessage>::ALL)
            .unwrap()
            .to("fallback")
            .unwrap();
        router
    }

    #[test]
    fn delimiters_and_flags() {
        assert_eq!(split_delimiters("/.*/").unwrap(), (".*", ""));
        assert_eq!(split_delimiters("/order/i").unwrap(), ("order", "i"));
        assert_eq!(split_delimiters("order").unwrap(), ("order", ""));
        assert_eq!(split_delimiters("/a/b/").unwrap(), ("a/b", ""));

        assert!(compile("/ORDER\\..*/i").unwrap().is_match("order.create"));
        assert!(!compile("order").unwrap().is_match("order.create"));
        assert!(compile("/.*/").unwrap().is_match(""));
    }

    #[test]
    fn extended_mode_comment_stays_inside_the_body() {
        let regex = compile("/order # orders/x").unwrap();
        assert!(regex.is_match("order"));
        assert!(!regex.is_match("order.create"));
        assert!(!compile("/order/").unwrap().is_match("order\n"));

        let mut router = RegexRouter::<TestMessage>::new();
        router.route("/order # orders/x").unwrap().to("orders").unwrap();
        assert_eq!(
            router.resolve("order").unwrap().map(Rule::pattern),
            Some("/order # orders/x")
        );
    }

    #[test]
    fn unknown_flag_is_rejected() {
        for pattern in ["/order/U", "/a/bq"] {
            assert!(matches!(
                split_delimiters(pattern),
                Err(InvalidArgument::InvalidPattern { .. })
            ));
        }

        let mut router = RegexRouter::<TestMessage>::new();
        let err = router.route("/order/U").err().unwrap();
        assert!(matches!(
            err.as_invalid_argument(),
            Some(InvalidArgument::InvalidPattern { pattern, .. }) if pattern == "/order/U"
        ));
        assert_eq!(router.pending_pattern(), None);
    }

    #[test]
    fn invalid_pattern_keeps_router_idle() {
        let mut router = RegexRouter::<TestMessage>::new();
        let err = router.route("/(unclosed/").err().unwrap();
        assert!(matches!(
            err.as_invalid_argument(),
            Some(InvalidArgument::InvalidPattern { .. })
        ));
        assert_eq!(router.pending_pattern(), None);

        let err = router.route("").err().unwrap();
        assert!(matches!(
            err.as_invalid_argument(),
            Some(InvalidArgument::EmptyPattern)
        ));
    }

    #[test]
    fn unterminated_binding_names_pending_pattern() {
        let mut router = RegexRouter::<TestMessage>::new();
        router.route("/^a/").unwrap();
        let err = router.route("/^b/").err().unwrap();
        assert_eq!(
            err.as_runtime(),
            Some(&RuntimeError::UnterminatedPatternBinding {
                pattern: "/^a/".into()
            })
        );
        assert_eq!(router.pending_pattern(), Some("/^a/"));
    }

    #[test]
    fn to_without_route_is_unbound() {
        let mut router = RegexRouter::<TestMessage>::new();
        let err = router.to("orphan").err().unwrap();
        assert_eq!(
            err.as_runtime(),
            Some(&RuntimeError::UnboundPattern {
                handler: "orphan".into()
            })
        );
        assert!(router.is_empty());
    }

    #[test]
    fn malformed_handler_keeps_binding_open() {
        let mut router = RegexRouter::<TestMessage>::new();
        router.route("/^a/").unwrap();
        assert!(router.to("").is_err());
        assert_eq!(router.pending_pattern(), Some("/^a/"));
        router.to("a").unwrap();
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn resolve_reports_first_conflict() {
        let router = table();
        assert_eq!(
            router.resolve("order.create").err(),
            Some(RuntimeError::AmbiguousRoute {
                message_name: "order.create".into(),
                first: r"/^order\..*/".into(),
                second: "/.*/".into(),
            })
        );
        let rule = router.resolve("payment.create").unwrap().unwrap();
        assert_eq!(rule.handler(), &HandlerRef::named("fallback"));
    }

    #[test]
    fn exact_duplicate_rule_is_not_ambiguous() {
        let router =
            RegexRouter::<TestMessage>::from_routes([("/^a$/", vec!["h", "h"])]).unwrap();
        assert_eq!(router.len(), 2);
        assert!(router.resolve("a").unwrap().is_some());

        let router =
            RegexRouter::<TestMessage>::from_routes([("/^a$/", vec!["h", "g"])]).unwrap();
        assert_eq!(
            router.resolve("a").err(),
            Some(RuntimeError::AmbiguousRoute {
                message_name: "a".into(),
                first: "/^a$/".into(),
                second: "/^a$/".into(),
            })
        );
    }
}
