use crate::blocks::block::{
    Block, BlockId, BlockKind, LiteralValue, NumberKind, OperatorClass, Parameter,
};
use crate::blocks::map::NodeBlockMap;
use crate::config::{EditorConfig, EntrySettings};
use crate::sugar::{SugarIndex, SugarKind, SugarRules};
use crate::syntax::{JavaKind, NodeId, StructuralLocator, StructuralTarget, SyntaxTree};
use serde::Serialize;

/// How completely the source could be lifted into blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildStatus {
    Complete,
    /// Built from a tree that contains parse errors.
    Partial { errors: usize },
    NoTypeDeclaration,
    EntryClassMissing { class: String },
    EntryMethodMissing { method: String },
}

impl BuildStatus {
    /// True when the tree has a root block.
    pub fn has_root(&self) -> bool {
        matches!(self, BuildStatus::Complete | BuildStatus::Partial { .. })
    }
}

/// A syntax node that no block represents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OmittedNode {
    #[serde(skip)]
    pub node: NodeId,
    pub kind: &'static str,
    pub line: usize,
}

/// Result of one build pass over a [`SyntaxTree`].
#[derive(Debug, Clone)]
pub struct BlockTree {
    pub root: Option<Block>,
    pub map: NodeBlockMap,
    pub status: BuildStatus,
    pub omitted: Vec<OmittedNode>,
    /// Generation of the syntax tree the blocks were built from.
    pub generation: u64,
}

impl BlockTree {
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn find(&self, id: &BlockId) -> Option<&Block> {
        self.root.as_ref()?.find(id)
    }

    /// Every block in pre-order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.root.iter().flat_map(|root| root.iter())
    }
}

/// Statements and expressions nested deeper than this are omitted.
const MAX_DEPTH: usize = 128;

/// Lifts a parsed program into a block tree.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
    entry: EntrySettings,
    rules: SugarRules,
}

impl Default for BlockBuilder {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl BlockBuilder {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            entry: config.entry.clone(),
            rules: SugarRules::from_settings(&config.sugar),
        }
    }

    pub fn build(&self, tree: &SyntaxTree) -> BlockTree {
        let sugar = SugarIndex::scan(tree.source(), &self.rules).unwrap_or_else(|error| {
            tracing::warn!(%error, "sugar scan failed, building without sugar");
            SugarIndex::default()
        });

        let mut walker = Walker {
            tree,
            sugar,
            entry_method: &self.entry.method,
            map: NodeBlockMap::new(),
            omitted: Vec::new(),
            depth: 0,
        };

        let (root, status) = match self.root_declaration(tree) {
            Ok(node) => {
                let root = match tree.kind(node) {
                    JavaKind::EnumDeclaration => walker.enum_declaration(node, None),
                    _ => walker.class(node, None),
                };
                let status = if tree.has_errors() {
                    BuildStatus::Partial {
                        errors: tree.error_count(),
                    }
                } else {
                    BuildStatus::Complete
                };
                (Some(root), status)
            }
            Err(status) => (None, status),
        };

        tracing::debug!(
            blocks = walker.map.len(),
            omitted = walker.omitted.len(),
            ?status,
            "built block tree"
        );

        BlockTree {
            root,
            map: walker.map,
            status,
            omitted: walker.omitted,
            generation: tree.generation(),
        }
    }

    fn root_declaration(&self, tree: &SyntaxTree) -> Result<NodeId, BuildStatus> {
        let locator = StructuralLocator::new(tree);

        let declaration = match &self.entry.class {
            Some(name) => locator
                .locate_first(&StructuralTarget::Class { name: name.clone() })
                .unwrap_or_else(|error| {
                    tracing::warn!(%error, "entry class lookup failed");
                    None
                })
                .map(|found| found.node)
                .ok_or_else(|| BuildStatus::EntryClassMissing {
                    class: name.clone(),
                })?,
            None => tree
                .named_children(tree.root())
                .find(|node| {
                    matches!(
                        tree.kind(*node),
                        JavaKind::ClassDeclaration | JavaKind::EnumDeclaration
                    )
                })
                .ok_or(BuildStatus::NoTypeDeclaration)?,
        };

        if self.entry.require_method && tree.kind(declaration) == JavaKind::ClassDeclaration {
            let target = StructuralTarget::Method {
                class: Some(declaration),
                name: self.entry.method.clone(),
            };
            let found = locator.locate_first(&target).unwrap_or_else(|error| {
                tracing::warn!(%error, "entry method lookup failed");
                None
            });
            if found.is_none() {
                return Err(BuildStatus::EntryMethodMissing {
                    method: self.entry.method.clone(),
                });
            }
        }

        Ok(declaration)
    }
}

struct Walker<'t> {
    tree: &'t SyntaxTree,
    sugar: SugarIndex,
    entry_method: &'t str,
    map: NodeBlockMap,
    omitted: Vec<OmittedNode>,
    depth: usize,
}

impl<'t> Walker<'t> {
    fn open(&mut self, kind: &BlockKind, node: NodeId, parent: Option<&BlockId>) -> BlockId {
        let id = BlockId::new(kind.slug(), &self.tree.path(node));
        self.map.insert_block(&id, node, parent);
        id
    }

    fn leaf(&mut self, kind: BlockKind, node: NodeId, parent: &BlockId) -> Block {
        let id = self.open(&kind, node, Some(parent));
        Block {
            id,
            kind,
            node,
            children: Vec::new(),
        }
    }

    fn claim(&mut self, id: &BlockId, node: NodeId) {
        self.map.add_contributing(id, node);
    }

    fn claim_subtree(&mut self, id: &BlockId, node: NodeId) {
        let tree = self.tree;
        for descendant in tree.descendants(node) {
            self.map.add_contributing(id, descendant);
        }
    }

    /// Runs `lift` one level deeper. Past [`MAX_DEPTH`] the node is omitted
    /// instead.
    fn nested(
        &mut self,
        node: NodeId,
        lift: impl FnOnce(&mut Self) -> Option<Block>,
    ) -> Option<Block> {
        if self.depth >= MAX_DEPTH {
            self.omit(node);
            return None;
        }
        self.depth += 1;
        let block = lift(self);
        self.depth -= 1;
        block
    }

    fn omit(&mut self, node: NodeId) {
        let syntax = self.tree.node(node);
        let line = self.tree.line_of(syntax.span.start);
        tracing::debug!(kind = syntax.raw_kind, line, "no block for node");
        self.omitted.push(OmittedNode {
            node,
            kind: syntax.raw_kind,
            line,
        });
    }

    fn field_text(&self, node: NodeId, field: &str) -> String {
        self.tree
            .child_by_field(node, field)
            .map(|child| self.tree.text(child).to_string())
            .unwrap_or_default()
    }

    /// Named children that are not comments.
    fn operands(&self, node: NodeId) -> Vec<NodeId> {
        let tree = self.tree;
        tree.named_children(node)
            .filter(|child| !tree.kind(*child).is_comment())
            .collect()
    }

    fn expressions(&mut self, nodes: &[NodeId], parent: &BlockId) -> Vec<Block> {
        nodes
            .iter()
            .filter_map(|node| self.expression(*node, parent))
            .collect()
    }

    // Declarations

    fn class(&mut self, node: NodeId, parent: Option<&BlockId>) -> Block {
        let tree = self.tree;
        let kind = BlockKind::Class {
            name: self.field_text(node, "name"),
        };
        let id = self.open(&kind, node, parent);

        let mut children = Vec::new();
        if let Some(body) = tree.child_by_field(node, "body") {
            self.claim(&id, body);
            for member in tree.named_children(body) {
                if let Some(block) = self.member(member, &id) {
                    children.push(block);
                }
            }
        }

        Block {
            id,
            kind,
            node,
            children,
        }
    }

    fn member(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        match self.tree.kind(node) {
            JavaKind::MethodDeclaration => Some(self.method(node, parent)),
            JavaKind::FieldDeclaration => Some(self.field(node, parent)),
            JavaKind::EnumDeclaration => Some(self.enum_declaration(node, Some(parent))),
            JavaKind::LineComment | JavaKind::BlockComment => Some(self.comment(node, parent)),
            _ => {
                self.omit(node);
                None
            }
        }
    }

    fn method(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let name = self.field_text(node, "name");
        let parameters = tree
            .child_by_field(node, "parameters")
            .map(|list| {
                tree.named_children(list)
                    .filter(|param| tree.kind(*param) == JavaKind::FormalParameter)
                    .map(|param| Parameter {
                        type_name: self.field_text(param, "type"),
                        name: self.field_text(param, "name"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        let kind = BlockKind::Method {
            entry: name == self.entry_method,
            name,
            return_type: self.field_text(node, "type"),
            parameters,
        };
        let id = self.open(&kind, node, Some(parent));
        if let Some(list) = tree.child_by_field(node, "parameters") {
            self.claim_subtree(&id, list);
        }

        let children = tree
            .child_by_field(node, "body")
            .map(|body| vec![self.body(body, &id)])
            .unwrap_or_default();

        Block {
            id,
            kind,
            node,
            children,
        }
    }

    fn field(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let declarator = tree.child_by_field(node, "declarator");
        let kind = BlockKind::Field {
            type_name: self.field_text(node, "type"),
            name: declarator
                .map(|decl| self.field_text(decl, "name"))
                .unwrap_or_default(),
        };
        let id = self.open(&kind, node, Some(parent));

        let mut children = Vec::new();
        if let Some(declarator) = declarator {
            self.claim(&id, declarator);
            if let Some(value) = tree.child_by_field(declarator, "value") {
                children.extend(self.expression(value, &id));
            }
        }

        Block {
            id,
            kind,
            node,
            children,
        }
    }

    fn enum_declaration(&mut self, node: NodeId, parent: Option<&BlockId>) -> Block {
        let tree = self.tree;
        let body = tree.child_by_field(node, "body");
        let constants: Vec<NodeId> = body
            .map(|body| {
                tree.named_children(body)
                    .filter(|child| tree.kind(*child) == JavaKind::EnumConstant)
                    .collect()
            })
            .unwrap_or_default();

        let kind = BlockKind::DeclareEnum {
            name: self.field_text(node, "name"),
            constants: constants
                .iter()
                .map(|constant| self.field_text(*constant, "name"))
                .collect(),
        };
        let id = self.open(&kind, node, parent);
        if let Some(body) = body {
            self.claim_subtree(&id, body);
        }

        Block {
            id,
            kind,
            node,
            children: Vec::new(),
        }
    }

    fn comment(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let kind = BlockKind::Comment {
            text: self.tree.text(node).to_string(),
        };
        self.leaf(kind, node, parent)
    }

    // Statements

    fn body(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let id = self.open(&BlockKind::Body, node, Some(parent));
        let children = tree
            .named_children(node)
            .filter_map(|item| self.statement(item, &id))
            .collect();

        Block {
            id,
            kind: BlockKind::Body,
            node,
            children,
        }
    }

    fn statement(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        self.nested(node, |walker| walker.lift_statement(node, parent))
    }

    fn lift_statement(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        match self.tree.kind(node) {
            JavaKind::Block => Some(self.body(node, parent)),
            JavaKind::LocalVariableDeclaration => Some(self.local_variable(node, parent)),
            JavaKind::ExpressionStatement => self.expression_statement(node, parent),
            JavaKind::IfStatement => Some(self.if_statement(node, parent)),
            JavaKind::WhileStatement => Some(self.while_statement(node, parent)),
            JavaKind::DoStatement => Some(self.do_statement(node, parent)),
            JavaKind::EnhancedForStatement => Some(self.for_each(node, parent)),
            JavaKind::SwitchExpression => Some(self.switch(node, parent)),
            JavaKind::BreakStatement => Some(self.leaf(BlockKind::Break, node, parent)),
            JavaKind::ContinueStatement => Some(self.leaf(BlockKind::Continue, node, parent)),
            JavaKind::ReturnStatement => Some(self.return_statement(node, parent)),
            JavaKind::TryStatement => self.wait(node, parent),
            JavaKind::EnumDeclaration => Some(self.enum_declaration(node, Some(parent))),
            JavaKind::LineComment | JavaKind::BlockComment => Some(self.comment(node, parent)),
            JavaKind::ForStatement
            | JavaKind::LabeledStatement
            | JavaKind::ThrowStatement
            | JavaKind::EmptyStatement
            | JavaKind::ClassDeclaration
            | JavaKind::Program
            | JavaKind::PackageDeclaration
            | JavaKind::ImportDeclaration
            | JavaKind::ClassBody
            | JavaKind::EnumBody
            | JavaKind::EnumConstant
            | JavaKind::EnumBodyDeclarations
            | JavaKind::FieldDeclaration
            | JavaKind::MethodDeclaration
            | JavaKind::ConstructorDeclaration
            | JavaKind::FormalParameters
            | JavaKind::FormalParameter
            | JavaKind::VariableDeclarator
            | JavaKind::Modifiers
            | JavaKind::SwitchBlock
            | JavaKind::SwitchBlockStatementGroup
            | JavaKind::SwitchRule
            | JavaKind::SwitchLabel
            | JavaKind::CatchClause
            | JavaKind::FinallyClause
            | JavaKind::MethodInvocation
            | JavaKind::ArgumentList
            | JavaKind::FieldAccess
            | JavaKind::BinaryExpression
            | JavaKind::UnaryExpression
            | JavaKind::UpdateExpression
            | JavaKind::AssignmentExpression
            | JavaKind::ParenthesizedExpression
            | JavaKind::ArrayCreationExpression
            | JavaKind::ArrayInitializer
            | JavaKind::ObjectCreationExpression
            | JavaKind::ArrayAccess
            | JavaKind::CastExpression
            | JavaKind::TernaryExpression
            | JavaKind::Identifier
            | JavaKind::This
            | JavaKind::StringLiteral
            | JavaKind::CharacterLiteral
            | JavaKind::IntegerLiteral
            | JavaKind::FloatLiteral
            | JavaKind::True
            | JavaKind::False
            | JavaKind::NullLiteral
            | JavaKind::TypeIdentifier
            | JavaKind::ScopedTypeIdentifier
            | JavaKind::GenericType
            | JavaKind::ArrayType
            | JavaKind::IntegralType
            | JavaKind::FloatingPointType
            | JavaKind::BooleanType
            | JavaKind::VoidType
            | JavaKind::Dimensions
            | JavaKind::Error
            | JavaKind::Other => {
                self.omit(node);
                None
            }
        }
    }

    /// Statement or body in a branch position (`if` arms, loop bodies).
    fn branch(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        match self.tree.kind(node) {
            JavaKind::Block => Some(self.body(node, parent)),
            _ => self.statement(node, parent),
        }
    }

    fn local_variable(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let type_name = self.field_text(node, "type");
        let declarator = tree.child_by_field(node, "declarator");
        let name = declarator
            .map(|decl| self.field_text(decl, "name"))
            .unwrap_or_default();
        let value = declarator.and_then(|decl| tree.child_by_field(decl, "value"));

        if let Some(value) = value {
            if let Some(SugarKind::ReadInput(accessor)) = self.sugar.call_at(&tree.span(value)) {
                let kind = BlockKind::ReadInput {
                    accessor,
                    type_name,
                    name,
                };
                let id = self.open(&kind, node, Some(parent));
                if let Some(declarator) = declarator {
                    self.claim_subtree(&id, declarator);
                }
                return Block {
                    id,
                    kind,
                    node,
                    children: Vec::new(),
                };
            }
        }

        let kind = BlockKind::VariableDeclaration { type_name, name };
        let id = self.open(&kind, node, Some(parent));
        if let Some(declarator) = declarator {
            self.claim(&id, declarator);
        }
        let children = value
            .and_then(|value| self.expression(value, &id))
            .into_iter()
            .collect();

        Block {
            id,
            kind,
            node,
            children,
        }
    }

    fn expression_statement(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        let tree = self.tree;
        let Some(expr) = tree.named_children(node).next() else {
            self.omit(node);
            return None;
        };

        match tree.kind(expr) {
            JavaKind::MethodInvocation => match self.sugar.call_at(&tree.span(expr)) {
                Some(SugarKind::Print { newline }) => Some(self.print(node, expr, newline, parent)),
                _ => Some(self.method_call(expr, node, parent)),
            },
            JavaKind::AssignmentExpression => {
                let kind = BlockKind::Assignment {
                    operator: self.field_text(expr, "operator"),
                };
                let id = self.open(&kind, node, Some(parent));
                self.claim(&id, expr);
                let operands: Vec<NodeId> = ["left", "right"]
                    .iter()
                    .filter_map(|field| tree.child_by_field(expr, field))
                    .collect();
                let children = self.expressions(&operands, &id);
                Some(Block {
                    id,
                    kind,
                    node,
                    children,
                })
            }
            JavaKind::UpdateExpression => {
                let children = tree.children(expr);
                let prefix = children
                    .first()
                    .is_some_and(|first| !tree.node(*first).named);
                let operator = children
                    .iter()
                    .find(|child| !tree.node(**child).named)
                    .map(|token| tree.text(*token).to_string())
                    .unwrap_or_default();

                let kind = BlockKind::Increment { operator, prefix };
                let id = self.open(&kind, node, Some(parent));
                self.claim(&id, expr);
                let operands = self.operands(expr);
                let children = self.expressions(&operands, &id);
                Some(Block {
                    id,
                    kind,
                    node,
                    children,
                })
            }
            _ => {
                self.omit(node);
                None
            }
        }
    }

    fn print(&mut self, node: NodeId, call: NodeId, newline: bool, parent: &BlockId) -> Block {
        let tree = self.tree;
        let kind = BlockKind::Print { newline };
        let id = self.open(&kind, node, Some(parent));
        self.claim(&id, call);
        for field in ["object", "name"] {
            if let Some(part) = tree.child_by_field(call, field) {
                self.claim_subtree(&id, part);
            }
        }

        let mut children = Vec::new();
        if let Some(arguments) = tree.child_by_field(call, "arguments") {
            self.claim(&id, arguments);
            let args = self.operands(arguments);
            children = self.expressions(&args, &id);
        }

        Block {
            id,
            kind,
            node,
            children,
        }
    }

    /// Call block anchored at `anchor`: the statement for a standalone call,
    /// the invocation itself in expression position.
    fn method_call(&mut self, call: NodeId, anchor: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let kind = BlockKind::MethodCall {
            scope: tree
                .child_by_field(call, "object")
                .map(|object| tree.text(object).to_string()),
            name: self.field_text(call, "name"),
        };
        let id = self.open(&kind, anchor, Some(parent));
        self.claim(&id, call);
        for field in ["object", "name"] {
            if let Some(part) = tree.child_by_field(call, field) {
                self.claim_subtree(&id, part);
            }
        }

        let mut children = Vec::new();
        if let Some(arguments) = tree.child_by_field(call, "arguments") {
            self.claim(&id, arguments);
            let args = self.operands(arguments);
            children = self.expressions(&args, &id);
        }

        Block {
            id,
            kind,
            node: anchor,
            children,
        }
    }

    fn if_statement(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let id = self.open(&BlockKind::If, node, Some(parent));

        let mut children = Vec::new();
        if let Some(condition) = tree.child_by_field(node, "condition") {
            children.extend(self.expression(condition, &id));
        }
        for field in ["consequence", "alternative"] {
            if let Some(arm) = tree.child_by_field(node, field) {
                children.extend(self.branch(arm, &id));
            }
        }

        Block {
            id,
            kind: BlockKind::If,
            node,
            children,
        }
    }

    fn while_statement(&mut self, node: NodeId, parent: &BlockId) -> Block {
        self.loop_block(BlockKind::While, node, &["condition", "body"], parent)
    }

    fn do_statement(&mut self, node: NodeId, parent: &BlockId) -> Block {
        self.loop_block(BlockKind::DoWhile, node, &["body", "condition"], parent)
    }

    fn for_each(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let kind = BlockKind::ForEach {
            type_name: self.field_text(node, "type"),
            variable: self.field_text(node, "name"),
        };
        self.loop_block(kind, node, &["value", "body"], parent)
    }

    fn loop_block(
        &mut self,
        kind: BlockKind,
        node: NodeId,
        fields: &[&str],
        parent: &BlockId,
    ) -> Block {
        let tree = self.tree;
        let id = self.open(&kind, node, Some(parent));

        let mut children = Vec::new();
        for field in fields {
            let Some(child) = tree.child_by_field(node, field) else {
                continue;
            };
            let block = if *field == "body" {
                self.branch(child, &id)
            } else {
                self.expression(child, &id)
            };
            children.extend(block);
        }

        Block {
            id,
            kind,
            node,
            children,
        }
    }

    fn switch(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let id = self.open(&BlockKind::Switch, node, Some(parent));

        let mut children = Vec::new();
        if let Some(condition) = tree.child_by_field(node, "condition") {
            children.extend(self.expression(condition, &id));
        }
        if let Some(body) = tree.child_by_field(node, "body") {
            self.claim(&id, body);
            for item in tree.named_children(body) {
                match tree.kind(item) {
                    JavaKind::SwitchBlockStatementGroup => children.push(self.case(item, &id)),
                    JavaKind::LineComment | JavaKind::BlockComment => {
                        children.push(self.comment(item, &id))
                    }
                    _ => self.omit(item),
                }
            }
        }

        Block {
            id,
            kind: BlockKind::Switch,
            node,
            children,
        }
    }

    fn case(&mut self, group: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let labels: Vec<NodeId> = tree
            .named_children(group)
            .filter(|child| tree.kind(*child) == JavaKind::SwitchLabel)
            .collect();
        let kind = BlockKind::SwitchCase {
            default: labels
                .iter()
                .any(|label| tree.text(*label).starts_with("default")),
        };
        let id = self.open(&kind, group, Some(parent));

        let mut children = Vec::new();
        for label in &labels {
            self.claim(&id, *label);
            let values = self.operands(*label);
            children.extend(self.expressions(&values, &id));
        }

        // The statements after the labels form the case body; it shares the
        // group node and, being registered last, owns it.
        let body_id = self.open(&BlockKind::Body, group, Some(&id));
        let statements = tree
            .named_children(group)
            .filter(|child| tree.kind(*child) != JavaKind::SwitchLabel)
            .filter_map(|item| self.statement(item, &body_id))
            .collect();
        children.push(Block {
            id: body_id,
            kind: BlockKind::Body,
            node: group,
            children: statements,
        });

        Block {
            id,
            kind,
            node: group,
            children,
        }
    }

    fn return_statement(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let id = self.open(&BlockKind::Return, node, Some(parent));
        let values = self.operands(node);
        let children = self.expressions(&values, &id);
        Block {
            id,
            kind: BlockKind::Return,
            node,
            children,
        }
    }

    /// Sleep call that is the only statement of a try body.
    fn sleep_call(&self, node: NodeId) -> Option<NodeId> {
        let tree = self.tree;
        let body = tree.child_by_field(node, "body")?;
        let statements = self.operands(body);
        let [statement] = statements.as_slice() else {
            return None;
        };
        if tree.kind(*statement) != JavaKind::ExpressionStatement {
            return None;
        }
        let call = tree.named_children(*statement).next()?;
        (tree.kind(call) == JavaKind::MethodInvocation
            && self.sugar.call_at(&tree.span(call)) == Some(SugarKind::Sleep))
        .then_some(call)
    }

    fn wait(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        let tree = self.tree;
        let Some(call) = self.sleep_call(node) else {
            self.omit(node);
            return None;
        };

        let id = self.open(&BlockKind::Wait, node, Some(parent));
        for child in tree.named_children(node) {
            self.claim_subtree(&id, child);
        }

        let args = tree
            .child_by_field(call, "arguments")
            .map(|arguments| self.operands(arguments))
            .unwrap_or_default();
        let children = self.expressions(&args[..args.len().min(1)], &id);

        Some(Block {
            id,
            kind: BlockKind::Wait,
            node,
            children,
        })
    }

    // Expressions

    fn expression(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        self.nested(node, |walker| walker.lift_expression(node, parent))
    }

    fn lift_expression(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        let tree = self.tree;
        let text = tree.text(node);
        let literal = |value| BlockKind::Literal { value };

        match tree.kind(node) {
            JavaKind::StringLiteral => {
                let inner = strip_delimiters(text, '"');
                Some(self.leaf(literal(LiteralValue::Text(inner)), node, parent))
            }
            JavaKind::CharacterLiteral => {
                let inner = strip_delimiters(text, '\'');
                Some(self.leaf(literal(LiteralValue::Char(inner)), node, parent))
            }
            JavaKind::IntegerLiteral | JavaKind::FloatLiteral => {
                let value = number(text, tree.kind(node));
                Some(self.leaf(literal(value), node, parent))
            }
            JavaKind::True => Some(self.leaf(literal(LiteralValue::Boolean(true)), node, parent)),
            JavaKind::False => Some(self.leaf(literal(LiteralValue::Boolean(false)), node, parent)),
            JavaKind::NullLiteral => Some(self.leaf(literal(LiteralValue::Null), node, parent)),
            JavaKind::Identifier | JavaKind::This => {
                let kind = BlockKind::Identifier {
                    name: text.to_string(),
                };
                Some(self.leaf(kind, node, parent))
            }
            JavaKind::ParenthesizedExpression => {
                let inner = self.operands(node).into_iter().next()?;
                let block = self.expression(inner, parent)?;
                self.claim(&block.id, node);
                Some(block)
            }
            JavaKind::FieldAccess => Some(self.field_access(node, parent)),
            JavaKind::MethodInvocation => match self.list_factory_arguments(node) {
                Some(arguments) => Some(self.list(node, Some(arguments), parent)),
                None => Some(self.method_call(node, node, parent)),
            },
            JavaKind::BinaryExpression => self.binary(node, parent),
            JavaKind::UnaryExpression => self.unary(node, parent),
            JavaKind::ArrayInitializer => Some(self.list(node, Some(node), parent)),
            JavaKind::ArrayCreationExpression => match tree.child_by_field(node, "value") {
                Some(initializer) => Some(self.list(node, Some(initializer), parent)),
                None => {
                    self.omit(node);
                    None
                }
            },
            JavaKind::ObjectCreationExpression => self.list_creation(node, parent),
            JavaKind::ArrayAccess
            | JavaKind::CastExpression
            | JavaKind::TernaryExpression
            | JavaKind::UpdateExpression
            | JavaKind::AssignmentExpression
            | JavaKind::ArgumentList
            | JavaKind::Program
            | JavaKind::PackageDeclaration
            | JavaKind::ImportDeclaration
            | JavaKind::ClassDeclaration
            | JavaKind::ClassBody
            | JavaKind::EnumDeclaration
            | JavaKind::EnumBody
            | JavaKind::EnumConstant
            | JavaKind::EnumBodyDeclarations
            | JavaKind::FieldDeclaration
            | JavaKind::MethodDeclaration
            | JavaKind::ConstructorDeclaration
            | JavaKind::FormalParameters
            | JavaKind::FormalParameter
            | JavaKind::VariableDeclarator
            | JavaKind::Modifiers
            | JavaKind::Block
            | JavaKind::LocalVariableDeclaration
            | JavaKind::ExpressionStatement
            | JavaKind::IfStatement
            | JavaKind::WhileStatement
            | JavaKind::DoStatement
            | JavaKind::ForStatement
            | JavaKind::EnhancedForStatement
            | JavaKind::SwitchExpression
            | JavaKind::SwitchBlock
            | JavaKind::SwitchBlockStatementGroup
            | JavaKind::SwitchRule
            | JavaKind::SwitchLabel
            | JavaKind::BreakStatement
            | JavaKind::ContinueStatement
            | JavaKind::ReturnStatement
            | JavaKind::TryStatement
            | JavaKind::CatchClause
            | JavaKind::FinallyClause
            | JavaKind::LabeledStatement
            | JavaKind::ThrowStatement
            | JavaKind::EmptyStatement
            | JavaKind::LineComment
            | JavaKind::BlockComment
            | JavaKind::TypeIdentifier
            | JavaKind::ScopedTypeIdentifier
            | JavaKind::GenericType
            | JavaKind::ArrayType
            | JavaKind::IntegralType
            | JavaKind::FloatingPointType
            | JavaKind::BooleanType
            | JavaKind::VoidType
            | JavaKind::Dimensions
            | JavaKind::Error
            | JavaKind::Other => {
                self.omit(node);
                None
            }
        }
    }

    fn field_access(&mut self, node: NodeId, parent: &BlockId) -> Block {
        let tree = self.tree;
        let object = tree.child_by_field(node, "object");
        let field = self.field_text(node, "field");

        let enum_like = object.is_some_and(|object| {
            tree.kind(object) == JavaKind::Identifier
                && tree.text(object).starts_with(char::is_uppercase)
                && is_constant_name(&field)
        });

        if enum_like {
            let kind = BlockKind::EnumConstant {
                enum_name: self.field_text(node, "object"),
                constant: field,
            };
            let id = self.open(&kind, node, Some(parent));
            self.claim_subtree(&id, node);
            return Block {
                id,
                kind,
                node,
                children: Vec::new(),
            };
        }

        let kind = BlockKind::FieldAccess { field };
        let id = self.open(&kind, node, Some(parent));
        let children = object
            .and_then(|object| self.expression(object, &id))
            .into_iter()
            .collect();
        Block {
            id,
            kind,
            node,
            children,
        }
    }

    fn binary(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        let tree = self.tree;
        let operator = self.field_text(node, "operator");
        let Some(class) = OperatorClass::of(&operator) else {
            self.omit(node);
            return None;
        };

        let kind = BlockKind::Binary { operator, class };
        let id = self.open(&kind, node, Some(parent));
        let operands: Vec<NodeId> = ["left", "right"]
            .iter()
            .filter_map(|field| tree.child_by_field(node, field))
            .collect();
        let children = self.expressions(&operands, &id);
        Some(Block {
            id,
            kind,
            node,
            children,
        })
    }

    fn unary(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        let tree = self.tree;
        let operator = self.field_text(node, "operator");
        let operand = tree.child_by_field(node, "operand");

        match (operator.as_str(), operand.map(|o| tree.kind(o))) {
            ("!", Some(_)) => {
                let id = self.open(&BlockKind::Not, node, Some(parent));
                let children = operand
                    .and_then(|operand| self.expression(operand, &id))
                    .into_iter()
                    .collect();
                Some(Block {
                    id,
                    kind: BlockKind::Not,
                    node,
                    children,
                })
            }
            ("-", Some(kind @ (JavaKind::IntegerLiteral | JavaKind::FloatLiteral))) => {
                let value = number(tree.text(node), kind);
                let block = self.leaf(BlockKind::Literal { value }, node, parent);
                if let Some(operand) = operand {
                    self.claim(&block.id, operand);
                }
                Some(block)
            }
            _ => {
                self.omit(node);
                None
            }
        }
    }

    /// Arguments of `Arrays.asList(..)` / `List.of(..)`.
    fn list_factory_arguments(&self, call: NodeId) -> Option<NodeId> {
        let tree = self.tree;
        let object = tree.text(tree.child_by_field(call, "object")?);
        let name = self.field_text(call, "name");
        let factory = matches!(
            (object, name.as_str()),
            ("Arrays", "asList") | ("List", "of")
        );
        factory.then(|| tree.child_by_field(call, "arguments")).flatten()
    }

    /// `new ArrayList<>(..)` holding a literal list, or nothing.
    fn list_creation(&mut self, node: NodeId, parent: &BlockId) -> Option<Block> {
        let tree = self.tree;
        let is_list_type = tree
            .child_by_field(node, "type")
            .is_some_and(|ty| tree.text(ty).starts_with("ArrayList"));
        let arguments = tree.child_by_field(node, "arguments");
        let args = arguments.map(|a| self.operands(a)).unwrap_or_default();

        if is_list_type {
            match args.as_slice() {
                [] => return Some(self.list(node, None, parent)),
                [inner] if tree.kind(*inner) == JavaKind::MethodInvocation => {
                    if let Some(inner_args) = self.list_factory_arguments(*inner) {
                        let block = self.list(node, Some(inner_args), parent);
                        self.claim_subtree_shallow(&block.id, *inner);
                        return Some(block);
                    }
                }
                _ => {}
            }
        }

        self.omit(node);
        None
    }

    /// Claim a node and its non-element children.
    fn claim_subtree_shallow(&mut self, id: &BlockId, call: NodeId) {
        let tree = self.tree;
        self.claim(id, call);
        for field in ["object", "name"] {
            if let Some(part) = tree.child_by_field(call, field) {
                self.claim(id, part);
            }
        }
    }

    fn list(&mut self, node: NodeId, elements: Option<NodeId>, parent: &BlockId) -> Block {
        let id = self.open(&BlockKind::List, node, Some(parent));
        let mut children = Vec::new();
        if let Some(elements) = elements {
            if elements != node {
                self.claim(&id, elements);
            }
            let items = self.operands(elements);
            children = self.expressions(&items, &id);
        }
        Block {
            id,
            kind: BlockKind::List,
            node,
            children,
        }
    }
}

fn strip_delimiters(text: &str, delimiter: char) -> String {
    text.strip_prefix(delimiter)
        .and_then(|rest| rest.strip_suffix(delimiter))
        .unwrap_or(text)
        .to_string()
}

fn number(text: &str, kind: JavaKind) -> LiteralValue {
    let kind = match kind {
        JavaKind::FloatLiteral if text.ends_with(['f', 'F']) => NumberKind::Float,
        JavaKind::FloatLiteral => NumberKind::Double,
        _ if text.ends_with(['l', 'L']) => NumberKind::Long,
        _ => NumberKind::Int,
    };
    LiteralValue::Number {
        text: text.to_string(),
        kind,
    }
}

fn is_constant_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(source: &str) -> (SyntaxTree, BlockTree) {
        let tree = SyntaxTree::parse(source).unwrap();
        let blocks = BlockBuilder::default().build(&tree);
        (tree, blocks)
    }

    fn main_body(blocks: &BlockTree) -> &Block {
        let class = blocks.root.as_ref().unwrap();
        let method = class
            .children
            .iter()
            .find(|b| matches!(&b.kind, BlockKind::Method { entry: true, .. }))
            .unwrap();
        &method.children[0]
    }

    fn wrap(body: &str) -> String {
        format!("public class Main {{\n    public static void main(String[] args) {{\n{body}\n    }}\n}}\n")
    }

    #[test]
    fn builds_class_method_and_declaration() {
        let (_, blocks) = build(&wrap("        int x = 10;"));
        assert_eq!(blocks.status, BuildStatus::Complete);

        let class = blocks.root.as_ref().unwrap();
        assert_eq!(
            class.kind,
            BlockKind::Class {
                name: "Main".to_string()
            }
        );

        let body = main_body(&blocks);
        assert_eq!(body.kind, BlockKind::Body);
        let decl = &body.children[0];
        assert_eq!(
            decl.kind,
            BlockKind::VariableDeclaration {
                type_name: "int".to_string(),
                name: "x".to_string()
            }
        );
        assert!(matches!(
            &decl.children[0].kind,
            BlockKind::Literal { value: LiteralValue::Number { text, kind: NumberKind::Int } } if text == "10"
        ));
    }

    #[test]
    fn method_signature_is_captured() {
        let (_, blocks) = build("class A { static int add(int a, int b) { return a + b; } }");
        let method = &blocks.root.as_ref().unwrap().children[0];
        match &method.kind {
            BlockKind::Method {
                name,
                return_type,
                parameters,
                entry,
            } => {
                assert_eq!(name, "add");
                assert_eq!(return_type, "int");
                assert_eq!(parameters.len(), 2);
                assert_eq!(parameters[1].name, "b");
                assert!(!entry);
            }
            other => panic!("unexpected {other:?}"),
        }
        let ret = &method.children[0].children[0];
        assert_eq!(ret.kind, BlockKind::Return);
        assert!(matches!(
            &ret.children[0].kind,
            BlockKind::Binary { operator, class: OperatorClass::Arithmetic } if operator == "+"
        ));
    }

    #[test]
    fn if_chain_nests_else_if() {
        let (_, blocks) = build(&wrap(
            "        if (x > 1) {\n            x = 1;\n        } else if (x < 0) {\n            x = 0;\n        } else {\n            x++;\n        }",
        ));
        let stmt = &main_body(&blocks).children[0];
        assert_eq!(stmt.kind, BlockKind::If);
        assert_eq!(stmt.children.len(), 3);
        assert!(matches!(stmt.children[0].kind, BlockKind::Binary { .. }));
        assert_eq!(stmt.children[1].kind, BlockKind::Body);

        let nested = &stmt.children[2];
        assert_eq!(nested.kind, BlockKind::If);
        let last = &nested.children[2].children[0];
        assert_eq!(
            last.kind,
            BlockKind::Increment {
                operator: "++".to_string(),
                prefix: false
            }
        );
    }

    #[test]
    fn parenthesized_condition_maps_to_inner_block() {
        let source = wrap("        if (true) {\n        }");
        let (tree, blocks) = build(&source);
        let condition = &main_body(&blocks).children[0].children[0];
        assert_eq!(
            condition.kind,
            BlockKind::Literal {
                value: LiteralValue::Boolean(true)
            }
        );

        let paren_offset = source.find("(true)").unwrap();
        assert_eq!(
            blocks.map.block_at_offset(&tree, paren_offset),
            Some(&condition.id)
        );
    }

    #[test]
    fn sugar_shapes_become_blocks() {
        let (_, blocks) = build(&wrap(
            "        System.out.println(\"hi\");\n        int n = scanner.nextInt();\n        try {\n            Thread.sleep(1000);\n        } catch (InterruptedException e) {\n        }",
        ));
        let body = main_body(&blocks);
        assert_eq!(body.children.len(), 3);

        let print = &body.children[0];
        assert_eq!(print.kind, BlockKind::Print { newline: true });
        assert_eq!(
            print.children[0].kind,
            BlockKind::Literal {
                value: LiteralValue::Text("hi".to_string())
            }
        );

        assert!(matches!(
            &body.children[1].kind,
            BlockKind::ReadInput { accessor: crate::sugar::InputAccessor::Int, name, .. } if name == "n"
        ));

        let wait = &body.children[2];
        assert_eq!(wait.kind, BlockKind::Wait);
        assert_eq!(wait.children.len(), 1);
    }

    #[test]
    fn try_with_extra_statements_is_not_a_wait() {
        let (_, blocks) = build(&wrap(
            "        try {\n            Thread.sleep(5);\n            x = 1;\n        } catch (Exception e) {\n        }",
        ));
        assert!(main_body(&blocks).children.is_empty());
        assert_eq!(blocks.omitted[0].kind, "try_statement");
    }

    #[test]
    fn classic_for_is_omitted_without_failing() {
        let (_, blocks) = build(&wrap(
            "        int a = 1;\n        for (int i = 0; i < 3; i++) {\n        }\n        a = 2;",
        ));
        let body = main_body(&blocks);
        assert_eq!(body.children.len(), 2);
        assert_eq!(blocks.omitted.len(), 1);
        assert_eq!(blocks.omitted[0].kind, "for_statement");
        assert_eq!(blocks.omitted[0].line, 4);
    }

    #[test]
    fn unusable_sugar_pattern_builds_without_sugar() {
        let mut config = EditorConfig::default();
        config.sugar.sleep_call = "a(); Thread.sleep".to_string();
        let tree = SyntaxTree::parse(wrap("        System.out.println(1);")).unwrap();
        let blocks = BlockBuilder::new(&config).build(&tree);

        let body = main_body(&blocks);
        assert_eq!(body.children.len(), 1);
        assert!(matches!(body.children[0].kind, BlockKind::MethodCall { .. }));
    }

    #[test]
    fn deep_nesting_is_omitted_past_the_limit() {
        let depth = 3000;
        let value = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
        let (_, blocks) = build(&wrap(&format!("        int x = {value};\n        x++;")));

        assert_eq!(blocks.status, BuildStatus::Complete);
        let body = main_body(&blocks);
        assert_eq!(body.children.len(), 2);
        assert!(body.children[0].children.is_empty());
        assert_eq!(blocks.omitted.len(), 1);
        assert_eq!(blocks.omitted[0].kind, "parenthesized_expression");
        assert_eq!(blocks.omitted[0].line, 3);
    }

    #[test]
    fn enums_and_constants() {
        let (_, blocks) = build(
            "class Main {\n    enum Color { RED, GREEN }\n    static void main(String[] a) {\n        Color c = Color.RED;\n    }\n}",
        );
        let class = blocks.root.as_ref().unwrap();
        assert_eq!(
            class.children[0].kind,
            BlockKind::DeclareEnum {
                name: "Color".to_string(),
                constants: vec!["RED".to_string(), "GREEN".to_string()]
            }
        );
        let decl = &main_body(&blocks).children[0];
        assert_eq!(
            decl.children[0].kind,
            BlockKind::EnumConstant {
                enum_name: "Color".to_string(),
                constant: "RED".to_string()
            }
        );
    }

    #[test]
    fn list_shapes() {
        let (_, blocks) = build(&wrap(
            "        int[] a = {1, 2};\n        ArrayList<Integer> b = new ArrayList<>(Arrays.asList(1, 2, 3));\n        int[][] c = new int[][]{{0}};",
        ));
        let body = main_body(&blocks);
        let lists: Vec<&Block> = body.children.iter().map(|d| &d.children[0]).collect();
        assert!(lists.iter().all(|l| l.kind == BlockKind::List));
        assert_eq!(lists[0].children.len(), 2);
        assert_eq!(lists[1].children.len(), 3);
        assert_eq!(lists[2].children[0].kind, BlockKind::List);
    }

    #[test]
    fn switch_cases_carry_bodies() {
        let (_, blocks) = build(&wrap(
            "        switch (x) {\n            case 1:\n                x = 2;\n                break;\n            default:\n                break;\n        }",
        ));
        let switch = &main_body(&blocks).children[0];
        assert_eq!(switch.kind, BlockKind::Switch);
        assert_eq!(switch.children.len(), 3);

        let first = &switch.children[1];
        assert_eq!(first.kind, BlockKind::SwitchCase { default: false });
        let body = first.children.last().unwrap();
        assert_eq!(body.kind, BlockKind::Body);
        assert_eq!(body.children.len(), 2);

        assert_eq!(
            switch.children[2].kind,
            BlockKind::SwitchCase { default: true }
        );
    }

    #[test]
    fn missing_type_yields_empty_tree() {
        let (_, blocks) = build("import java.util.List;\n");
        assert!(blocks.is_empty());
        assert_eq!(blocks.status, BuildStatus::NoTypeDeclaration);
    }

    #[test]
    fn required_entry_method() {
        let tree = SyntaxTree::parse("class A { void run() {} }").unwrap();
        let mut config = EditorConfig::default();
        config.entry.require_method = true;
        let blocks = BlockBuilder::new(&config).build(&tree);
        assert!(blocks.is_empty());
        assert_eq!(
            blocks.status,
            BuildStatus::EntryMethodMissing {
                method: "main".to_string()
            }
        );
    }

    #[test]
    fn named_entry_class() {
        let tree = SyntaxTree::parse("class A {}\nclass B { void main() {} }").unwrap();
        let mut config = EditorConfig::default();
        config.entry.class = Some("B".to_string());
        let blocks = BlockBuilder::new(&config).build(&tree);
        assert!(matches!(
            &blocks.root.as_ref().unwrap().kind,
            BlockKind::Class { name } if name == "B"
        ));

        config.entry.class = Some("C".to_string());
        let blocks = BlockBuilder::new(&config).build(&tree);
        assert!(matches!(blocks.status, BuildStatus::EntryClassMissing { .. }));
    }

    #[test]
    fn every_block_is_mapped_both_ways() {
        let (_, blocks) = build(&wrap(
            "        // greet\n        System.out.print(\"a\" + 1);\n        while (!done) {\n            done = true;\n        }",
        ));
        for block in blocks.blocks() {
            let node = blocks.map.node_for_block(&block.id).unwrap();
            assert_eq!(node, block.node);
        }
        assert_eq!(blocks.map.len(), blocks.root.as_ref().unwrap().count());
    }
}
