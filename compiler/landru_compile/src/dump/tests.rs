#![allow(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use crate::compile_program;
use pretty_assertions::assert_eq;

use super::dump_program;

#[test]
fn test_dump_tree() {
    let tape = landru_lexer::read(
        "(require io)
         (set e 3.0)
         (machine m
           (state main
             (io.print (math.add 1 2))
             (on time.after 1.5 (goto done)))
           (state done ())
           (defun twice (x) (math.mul x 2)))
         (launch m)",
    )
    .unwrap();
    let program = compile_program(tape).unwrap();
    assert_eq!(
        dump_program(&program),
        "require io
root
  machine m
    state main
      on time.after 1.5
        goto done
      call io.print <list>
        call math.add 1 2
    state done
    function twice (defun x)
      call math.mul x 2
  set e 3.0
  launch m
"
    );
}
