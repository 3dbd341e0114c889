//! Flag types attached to AST nodes.

bitflags::bitflags! {
    /// Per-node flags recorded by the parser.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u16 {
        const NONE            = 0;
        /// The expression was written inside parentheses.
        const PARENTHESIZED   = 1 << 0;
        /// The node was produced by error recovery, not by source text.
        const SYNTHESIZED     = 1 << 1;
        /// A numeric literal written with legacy octal syntax.
        const LEGACY_OCTAL    = 1 << 2;
        /// A statement whose terminating semicolon was inserted automatically.
        const ASI_TERMINATED  = 1 << 3;
        /// A `new` expression written with an argument list.
        const HAS_ARGUMENTS   = 1 << 4;
    }
}
