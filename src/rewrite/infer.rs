//! Type context and leaf extraction for expressions.
//!
//! Both walk the syntax tree only; nothing here consults the block tree.

use crate::rewrite::types::TypeShape;
use crate::syntax::{JavaKind, NodeId, SyntaxTree};

/// Type an expression at `node` is expected to have, judged from where it
/// sits.
pub fn expected_type(tree: &SyntaxTree, node: NodeId) -> Option<TypeShape> {
    let boolean = || Some(TypeShape::Scalar("boolean".to_string()));

    // Parentheses are transparent, except around a loop or branch condition.
    let mut node = node;
    let mut parent = tree.parent(node)?;
    while tree.kind(parent) == JavaKind::ParenthesizedExpression {
        let owner = tree.parent(parent);
        let is_condition = tree.node(parent).field == Some("condition")
            && owner.is_some_and(|owner| {
                matches!(
                    tree.kind(owner),
                    JavaKind::IfStatement | JavaKind::WhileStatement | JavaKind::DoStatement
                )
            });
        if is_condition {
            return boolean();
        }
        node = parent;
        parent = owner?;
    }
    let field = tree.node(node).field;

    match tree.kind(parent) {
        JavaKind::VariableDeclarator if field == Some("value") => {
            let declaration = tree.parent(parent)?;
            declared_shape(tree, declaration)
        }
        JavaKind::ArrayInitializer => container_type(tree, parent)?.element().cloned(),
        JavaKind::ArrayCreationExpression if field == Some("value") => {
            container_type(tree, parent)
        }
        JavaKind::ArgumentList => {
            let call = tree.parent(parent)?;
            if is_list_factory(tree, call) {
                return container_type(tree, call)?.element().cloned();
            }
            if is_list_creation(tree, call) {
                return container_type(tree, call);
            }
            None
        }
        JavaKind::AssignmentExpression if field == Some("right") => {
            let left = tree.child_by_field(parent, "left")?;
            variable_type(tree, left, tree.text(left))
        }
        JavaKind::ReturnStatement => {
            let method = tree.enclosing(parent, JavaKind::MethodDeclaration)?;
            let ty = tree.child_by_field(method, "type")?;
            Some(TypeShape::parse(tree.text(ty))).filter(|shape| shape.leaf() != "void")
        }
        JavaKind::UnaryExpression => {
            let operator = tree.child_by_field(parent, "operator")?;
            (tree.text(operator) == "!").then(|| TypeShape::Scalar("boolean".to_string()))
        }
        JavaKind::BinaryExpression => {
            let operator = tree.child_by_field(parent, "operator")?;
            matches!(tree.text(operator), "&&" | "||")
                .then(|| TypeShape::Scalar("boolean".to_string()))
        }
        JavaKind::IfStatement | JavaKind::WhileStatement | JavaKind::DoStatement
            if field == Some("condition") =>
        {
            boolean()
        }
        _ => None,
    }
}

/// Shape of the container expression `node` itself.
pub fn container_type(tree: &SyntaxTree, node: NodeId) -> Option<TypeShape> {
    match tree.kind(node) {
        JavaKind::ArrayCreationExpression => {
            let ty = tree.child_by_field(node, "type")?;
            let dimensions: String = tree
                .children_by_field(node, "dimensions")
                .map(|dims| tree.text(dims))
                .collect::<String>()
                .split_whitespace()
                .collect();
            Some(TypeShape::parse(&format!("{}{dimensions}", tree.text(ty))))
        }
        JavaKind::ArrayInitializer => match tree.parent(node) {
            Some(parent) if tree.kind(parent) == JavaKind::ArrayCreationExpression => {
                container_type(tree, parent)
            }
            _ => expected_type(tree, node),
        },
        JavaKind::ObjectCreationExpression => expected_type(tree, node).or_else(|| {
            let ty = tree.child_by_field(node, "type")?;
            Some(TypeShape::parse(tree.text(ty))).filter(|shape| !shape.leaf().is_empty())
        }),
        _ => expected_type(tree, node),
    }
}

/// Declared type of a local, field, parameter or for-each declaration.
pub fn declared_shape(tree: &SyntaxTree, declaration: NodeId) -> Option<TypeShape> {
    let ty = tree.child_by_field(declaration, "type")?;
    Some(TypeShape::parse(tree.text(ty)))
}

/// Type of the variable `name` as seen from `at`: locals and parameters of
/// the enclosing method first, then fields of enclosing classes.
pub fn variable_type(tree: &SyntaxTree, at: NodeId, name: &str) -> Option<TypeShape> {
    let position = tree.span(at).start;
    if let Some(method) = enclosing_callable(tree, at) {
        let local = tree.descendants(method).find(|candidate| {
            let declares = match tree.kind(*candidate) {
                JavaKind::LocalVariableDeclaration => tree
                    .children_by_field(*candidate, "declarator")
                    .any(|decl| declarator_name(tree, decl) == Some(name)),
                JavaKind::FormalParameter | JavaKind::EnhancedForStatement => tree
                    .child_by_field(*candidate, "name")
                    .is_some_and(|n| tree.text(n) == name),
                _ => false,
            };
            declares && tree.span(*candidate).start <= position
        });
        if let Some(local) = local {
            return declared_shape(tree, local);
        }
    }

    tree.ancestors(at)
        .filter(|ancestor| tree.kind(*ancestor) == JavaKind::ClassBody)
        .find_map(|body| {
            tree.named_children(body)
                .filter(|member| tree.kind(*member) == JavaKind::FieldDeclaration)
                .find(|field| {
                    tree.children_by_field(*field, "declarator")
                        .any(|decl| declarator_name(tree, decl) == Some(name))
                })
        })
        .and_then(|field| declared_shape(tree, field))
}

pub fn enclosing_callable(tree: &SyntaxTree, node: NodeId) -> Option<NodeId> {
    tree.ancestors(node).find(|ancestor| {
        matches!(
            tree.kind(*ancestor),
            JavaKind::MethodDeclaration | JavaKind::ConstructorDeclaration
        )
    })
}

fn declarator_name(tree: &SyntaxTree, declarator: NodeId) -> Option<&str> {
    tree.child_by_field(declarator, "name")
        .map(|name| tree.text(name))
}

/// `Arrays.asList(..)` or `List.of(..)`.
pub fn is_list_factory(tree: &SyntaxTree, node: NodeId) -> bool {
    if tree.kind(node) != JavaKind::MethodInvocation {
        return false;
    }
    let object = tree.child_by_field(node, "object").map(|o| tree.text(o));
    let name = tree.child_by_field(node, "name").map(|n| tree.text(n));
    matches!(
        (object, name),
        (Some("Arrays"), Some("asList")) | (Some("List"), Some("of"))
    )
}

/// `new ArrayList<..>(..)`.
pub fn is_list_creation(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.kind(node) == JavaKind::ObjectCreationExpression
        && tree
            .child_by_field(node, "type")
            .is_some_and(|ty| tree.text(ty).starts_with("ArrayList"))
}

/// Leaf expressions of an initializer, unwrapping arrays, list factories and
/// list constructors in order.
pub fn collect_leaves(tree: &SyntaxTree, node: NodeId) -> Vec<String> {
    let elements = |list: NodeId| -> Vec<NodeId> {
        tree.named_children(list)
            .filter(|child| !tree.kind(*child).is_comment())
            .collect()
    };

    let mut leaves = Vec::new();
    let mut pending = vec![node];
    while let Some(node) = pending.pop() {
        let nested = match tree.kind(node) {
            JavaKind::ArrayCreationExpression => tree
                .child_by_field(node, "value")
                .map(elements)
                .unwrap_or_default(),
            JavaKind::ArrayInitializer => elements(node),
            JavaKind::ParenthesizedExpression => elements(node),
            _ if is_list_factory(tree, node) || is_list_creation(tree, node) => tree
                .child_by_field(node, "arguments")
                .map(elements)
                .unwrap_or_default(),
            _ => {
                leaves.push(tree.text(node).to_string());
                continue;
            }
        };
        pending.extend(nested.into_iter().rev());
    }
    leaves
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> SyntaxTree {
        SyntaxTree::parse(format!(
            "class A {{\n    double ratio;\n    int f(String s) {{\n{body}\n    }}\n}}\n"
        ))
        .unwrap()
    }

    fn find(tree: &SyntaxTree, text: &str) -> NodeId {
        tree.descendants(tree.root())
            .filter(|node| tree.node(*node).named)
            .find(|node| tree.text(*node) == text)
            .unwrap()
    }

    #[test]
    fn declaration_and_container_context() {
        let tree = parse("int[] a = new int[]{7, 8}; ArrayList<String> b = new ArrayList<>(List.of(\"q\"));");

        let seven = find(&tree, "7");
        assert_eq!(expected_type(&tree, seven), Some(TypeShape::parse("int")));

        let q = find(&tree, "\"q\"");
        assert_eq!(expected_type(&tree, q), Some(TypeShape::parse("String")));

        let creation = find(&tree, "new int[]{7, 8}");
        assert_eq!(expected_type(&tree, creation), Some(TypeShape::parse("int[]")));
    }

    #[test]
    fn assignment_return_and_condition_context() {
        let tree = parse("ratio = 2.5; s = \"x\"; if (flag) { } return 3;");

        assert_eq!(
            expected_type(&tree, find(&tree, "2.5")),
            Some(TypeShape::parse("double"))
        );
        assert_eq!(
            expected_type(&tree, find(&tree, "\"x\"")),
            Some(TypeShape::parse("String"))
        );
        assert_eq!(
            expected_type(&tree, find(&tree, "flag")),
            Some(TypeShape::parse("boolean"))
        );
        assert_eq!(
            expected_type(&tree, find(&tree, "3")),
            Some(TypeShape::parse("int"))
        );
    }

    #[test]
    fn leaves_unwrap_every_container() {
        let tree = parse(
            "int a = 10; int[][] b = new int[][]{{1, 2}, {3}}; ArrayList<Integer> c = new ArrayList<>(Arrays.asList(4, 5));",
        );

        assert_eq!(collect_leaves(&tree, find(&tree, "10")), vec!["10"]);
        assert_eq!(
            collect_leaves(&tree, find(&tree, "new int[][]{{1, 2}, {3}}")),
            vec!["1", "2", "3"]
        );
        assert_eq!(
            collect_leaves(&tree, find(&tree, "new ArrayList<>(Arrays.asList(4, 5))")),
            vec!["4", "5"]
        );
    }

    #[test]
    fn deeply_parenthesized_leaf() {
        let depth = 2000;
        let value = format!("{}7{}", "(".repeat(depth), ")".repeat(depth));
        let tree = parse(&format!("int a = {value};"));
        assert_eq!(collect_leaves(&tree, find(&tree, &value)), vec!["7"]);
        assert_eq!(
            expected_type(&tree, find(&tree, "7")),
            Some(TypeShape::parse("int"))
        );
    }
}
