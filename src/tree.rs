//! Tree data structure implementation for the search

use std::{cell::RefCell, rc::{Rc, Weak}};

/// Strong reference to a tree node
pub type NodeRef<T> = Rc<RefCell<Node<T>>>;
/// Weak reference to a tree node (to break reference cycles)
pub type WeakNodeRef<T> = Weak<RefCell<Node<T>>>;

/// A node in the tree structure
///
/// Children are owned through strong references and kept in insertion order,
/// the parent is only referenced weakly: dropping a node drops its whole
/// subtree, whatever the descendants still point to.
///
/// # Type Parameters
/// - `T`: The data type stored in the node
pub struct Node<T>{
    parent: Option<WeakNodeRef<T>>,
    children: Vec<NodeRef<T>>,
    data: T
}

#[allow(dead_code)]
impl<T> Node<T>{
    /// Creates a new root node with given data
    ///
    /// # Parameters
    /// - `data`: The data to store in the root node
    #[inline]
    pub fn new_root(data: T) -> NodeRef<T>{
        Rc::new(RefCell::new(Node{ parent: None, children: Vec::new(), data }))
    }

    /// Checks if this node is the root (has no parent)
    #[inline]
    pub fn is_root(&self) -> bool{
        self.parent.is_none()
    }

    /// Gets the parent node if it exists and is still alive
    #[inline]
    pub fn get_parent(&self) -> Option<NodeRef<T>>{
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Gets the children in insertion order
    #[inline]
    pub fn children(&self) -> &[NodeRef<T>]{
        &self.children
    }

    /// Appends a new child node
    ///
    /// # Parameters
    /// - `node`: The parent node
    /// - `data`: The data for the new child
    ///
    /// # Returns
    /// Reference to the newly created child node
    #[inline]
    pub fn add_child(node: &NodeRef<T>, data: T) -> NodeRef<T>{
        let ref_node = Rc::new(RefCell::new(
            Node{ parent: Some(Rc::downgrade(node)), children: Vec::new(), data }
        ));

        node.borrow_mut().children.push(Rc::clone(&ref_node));
        ref_node
    }

    /// Counts this node and all of its descendants
    pub fn subtree_size(&self) -> usize{
        1 + self.children.iter().map(|child| child.borrow().subtree_size()).sum::<usize>()
    }

    /// Gets a reference to the node's data
    #[inline]
    pub fn get(&self) -> &T{
        &self.data
    }

    /// Gets a mutable reference to the node's data
    #[inline]
    pub fn get_mut(&mut self) -> &mut T{
        &mut self.data
    }
}
