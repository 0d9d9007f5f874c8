use arch::reg::Reg;
use ppasm::include::Resolver;
use ppasm::sysinc::SYSTEM_INCLUDES;
use ppasm::Config;
use ppemu::hooks::{midi::Midi, Hook};
use ppemu::{Fault, Vm};
use std::io;

const MAX_TICKS: u64 = 100_000;

fn build(code: &str) -> Vec<u8> {
    let loader = |_: &str| -> io::Result<String> { Err(io::ErrorKind::NotFound.into()) };
    ppasm::assemble(
        "main.pp",
        code,
        &loader,
        &SYSTEM_INCLUDES,
        [Some("on_tick"), None, None],
    )
    .expect("assembly failed")
}

fn boot(code: &str) -> Vm {
    let mut vm = Vm::with_seed(0);
    vm.load(&build(code)).expect("load failed");
    vm
}

fn run(code: &str) -> Vm {
    let mut vm = boot(code);
    for _ in 0..MAX_TICKS {
        vm.tick().expect("vm fault");
        if vm.is_halted() {
            return vm;
        }
    }
    panic!("did not halt within {MAX_TICKS} ticks");
}

fn ticks(vm: &mut Vm, n: usize) {
    for _ in 0..n {
        vm.tick().expect("vm fault");
    }
}

#[test]
fn one_plus_two() {
    let vm = run("__start:\n  mov A, 1\n  add 2\n  halt");
    assert_eq!(vm.get(Reg::A), 3);

    let vm = run("__start:\n  mov A, 1\n  mov B, 2\n  add\n  halt");
    assert_eq!(vm.get(Reg::A), 3);
}

#[test]
fn countdown_loop() {
    let vm = run(
        "
__start:
    mov A, 5
    mov B, 0
loop:
    swap
    add 1
    swap
    sub 1
    jumpnz loop
    halt
",
    );
    assert_eq!((vm.get(Reg::A), vm.get(Reg::B)), (0, 5));
}

#[test]
fn table_lookup() {
    let vm = run(
        "
__start:
    mov B, 2
    load table[B], A
    mov B, 3
    store A, end - B
    load table, B
    halt
table:
    db 10
    db 20
    db 30
end:
    db 0
",
    );
    assert_eq!((vm.get(Reg::A), vm.get(Reg::B)), (30, 30));
}

#[test]
fn frame_operands() {
    let vm = run("__start:\n  push 7\n  push 9\n  mov A, fp\n  mov B, fp[-1]\n  halt");
    assert_eq!((vm.get(Reg::A), vm.get(Reg::B)), (7, 9));
    assert_eq!(vm.sp(), 0xfffd);
}

#[test]
fn nested_calls() {
    let vm = run(
        "
__start:
    mov B, 0x55
    push 1
    push 1
    call f1
    halt

f1:
    mov B, 0x11
    load +7(fp), A
    add 1
    push A
    push 1
    call f2
    store B, 0x9000
    ret

f2:
    mov B, 0x22
    load +7(fp), A
    add 1
    push A
    push 1
    call f3
    store B, 0x9001
    ret

f3:
    mov B, 0x33
    load +7(fp), A
    add 1
    ret
",
    );
    assert_eq!(vm.get(Reg::A), 4);
    assert_eq!(vm.get(Reg::B), 0x55);
    assert_eq!(vm.peek(0x9000), 0x11);
    assert_eq!(vm.peek(0x9001), 0x22);
    assert_eq!((vm.sp(), vm.fp()), (0xffff, 0xffff));
}

#[test]
fn ret_discards_arguments() {
    let vm = run(
        "
__start:
    push 4
    push 10
    push 2
    call diff
    halt

// args: (a, b) -> a - b
diff:
    load +8(fp), A
    swap
    load +7(fp), A
    sub
    ret
",
    );
    assert_eq!(vm.get(Reg::A), 6);
    assert_eq!(vm.get(Reg::B), 0);
    assert_eq!(vm.sp(), 0xffff);
}

const IDLE: &str = "
__start:
    mov A, 0x12
    mov B, 0x34
loop:
    jump loop

on_tick:
    mov A, 0xaa
    mov B, 0xbb
    store A, 0x9000
    reti
";

#[test]
fn interrupt_round_trip() {
    let mut vm = boot(IDLE);
    ticks(&mut vm, 3);
    let (ip, sp, fp) = (vm.ip(), vm.sp(), vm.fp());

    assert!(vm.interrupt(0));
    assert!(vm.in_interrupt());
    ticks(&mut vm, 2);
    assert_eq!((vm.get(Reg::A), vm.get(Reg::B)), (0xaa, 0xbb));

    ticks(&mut vm, 2);
    assert!(!vm.in_interrupt());
    assert_eq!(vm.peek(0x9000), 0xaa);
    assert_eq!((vm.get(Reg::A), vm.get(Reg::B)), (0x12, 0x34));
    assert_eq!((vm.ip(), vm.sp(), vm.fp()), (ip, sp, fp));

    assert!(vm.interrupt(0));
}

#[test]
fn interrupts_do_not_nest() {
    let mut vm = boot(IDLE);
    ticks(&mut vm, 3);
    assert!(vm.interrupt(0));
    let (ip, sp) = (vm.ip(), vm.sp());
    assert!(!vm.interrupt(0));
    assert_eq!((vm.ip(), vm.sp()), (ip, sp));
}

#[test]
fn unset_vector_is_ignored() {
    let mut vm = boot(IDLE);
    ticks(&mut vm, 3);
    assert!(!vm.interrupt(1));
    assert!(!vm.interrupt(3));
    assert!(!vm.in_interrupt());
}

#[test]
fn halted_ignores_interrupt() {
    let mut vm = run("__start: halt\non_tick: reti");
    assert!(!vm.interrupt(0));
    assert!(vm.is_halted());
}

fn build_bare(code: &str, header: bool) -> Vec<u8> {
    let loader = |_: &str| -> io::Result<String> { Err(io::ErrorKind::NotFound.into()) };
    let mut resolver = Resolver::new(&loader, &SYSTEM_INCLUDES);
    let tokens = resolver.resolve_source("main.pp", code).expect("include failed");
    let config = Config {
        vectors: false,
        header,
        interrupts: [Some("on_tick".to_string()), None, None],
    };
    ppasm::assemble_tokens(&tokens, &config)
        .expect("assembly failed")
        .to_bytes()
}

#[test]
fn no_vector_table_ignores_interrupts() {
    // byte 3 is the `0x16` operand, which reads as `jump`
    let code = "__start:\n  mov A, 0x16\n  mov B, 0x16\n  halt\non_tick:\n  reti";
    for header in [false, true] {
        let mut vm = Vm::with_seed(0);
        vm.load(&build_bare(code, header)).expect("load failed");
        assert_eq!(vm.peek(3), 0x16);
        assert!(!vm.interrupt(0));
        assert!(!vm.in_interrupt());
        assert_eq!((vm.ip(), vm.sp()), (0, 0xffff));

        ticks(&mut vm, 3);
        assert!(vm.is_halted());
        assert_eq!((vm.get(Reg::A), vm.get(Reg::B)), (0x16, 0x16));
    }
}

#[test]
fn faults() {
    let mut vm = boot("__start:\n  div 0\n  halt");
    assert_eq!(vm.tick(), Err(Fault::DivideByZero(12)));
    assert_eq!(vm.ip(), 12);

    let mut vm = boot("__start:\n  db 0xff");
    assert_eq!(vm.tick(), Err(Fault::UnknownOpcode(12, 0xff)));
}

#[test]
fn midi_trig_sends_note_on_and_off() {
    let mut vm = boot("#include <midi>\n__start:\n  push 60\n  push 1\n  call midi_trig\n  halt");
    let mut midi = Midi::new();
    vm = midi.init(vm);
    for time in 0..MAX_TICKS {
        let step = vm.tick().expect("vm fault");
        vm = midi.exec(time, step, vm);
        if vm.is_halted() {
            break;
        }
    }
    assert!(vm.is_halted());
    let sent: Vec<String> = midi.sent().iter().map(|m| m.to_string()).collect();
    assert_eq!(sent, vec!["90 3C 7F", "80 3C 40"]);
    assert_eq!(vm.sp(), 0xffff);
}
