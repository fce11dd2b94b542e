use avltree::AvlTree;

fn main() {
    let tree = AvlTree::<i32>::from([5, 7, 2, 4, 3, 8, 10, 1, 0, 6, 9]);

    print!("in order:   ");
    for x in tree.iter() {
        print!("{x} ");
    }
    println!();

    print!("pre order:  ");
    for x in tree.iter_preorder() {
        print!("{x} ");
    }
    println!();

    print!("post order: ");
    for x in tree.iter_postorder() {
        print!("{x} ");
    }
    println!();
}
